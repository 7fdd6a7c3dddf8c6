//! IR receiver sampling on the sensing node
//!
//! Reads the ring of receivers back to back. Every [`TSOP_LOOP_COUNT`] reads the
//! window is evaluated, the result published for the link responder, and the
//! receivers are power-cycled through the unlock pin.
//!
//! [`TSOP_LOOP_COUNT`]: crate::config::TSOP_LOOP_COUNT

use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Timer};

use crate::config::{TSOP_NUM, TSOP_UNLOCK_DELAY_MS};
use crate::sensing::ball::BallSensorArray;
use crate::task::link_respond::REPLY_CACHE;

#[embassy_executor::task]
pub async fn tsop_sample(receivers: [Input<'static>; TSOP_NUM], mut unlock: Output<'static>) {
    let mut array = BallSensorArray::default();

    loop {
        // receivers pull their output low while they see the carrier
        let detections = receivers
            .iter()
            .enumerate()
            .filter(|(_, receiver)| receiver.is_low())
            .fold(0u32, |mask, (i, _)| mask | (1 << i));
        array.record_sample(detections);

        if array.window_complete() {
            let observation = array.finish_window();
            REPLY_CACHE.publish_ball(observation, array.has_ball());

            unlock.set_low();
            Timer::after(Duration::from_millis(TSOP_UNLOCK_DELAY_MS)).await;
            unlock.set_high();
        }
    }
}
