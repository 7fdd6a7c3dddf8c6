//! Control node main loop
//!
//! Runs [`RobotContext::run_cycle`] back to back. Between cycles it picks up the
//! newest peer report, queues our own report for the radio task and drives the
//! heartbeat LED.

use embassy_futures::yield_now;
use embassy_time::Instant;

use crate::config::ROBOT_ID;
use crate::link::CommandChannel;
use crate::system::context::{Collaborators, RobotContext};
use crate::system::movement::MovementMailbox;
use crate::system::timer::Clock;
use crate::system::indicator::Heartbeat;
use crate::system::peer;
use crate::task::camera::Camera;
use crate::task::compass::Compass;
use crate::task::node_link::NodeLink;

/// embassy-time as the cycle clock
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Devices the control loop owns
pub struct ControlHardware {
    pub compass: Compass,
    pub camera: Camera,
    pub ball: CommandChannel<NodeLink>,
    pub line: CommandChannel<NodeLink>,
}

#[embassy_executor::task]
pub async fn control_loop(mut hardware: ControlHardware) {
    let mut context = RobotContext::default();
    let mut actuator = MovementMailbox;
    let mut heartbeat = Heartbeat::new();
    log_info!("control: robot {} starting", ROBOT_ID);

    loop {
        let mut io = Collaborators {
            heading: &mut hardware.compass,
            vision: &mut hardware.camera,
            ball: &mut hardware.ball,
            line: &mut hardware.line,
            actuator: &mut actuator,
        };
        let output = context
            .run_cycle(&mut io, &EmbassyClock, peer::take_received())
            .await;

        if let Some(frame) = output.broadcast {
            peer::send(frame);
        }
        heartbeat.beat(output.toggle_indicator);

        // let the radio and motor tasks run between cycles
        yield_now().await;
    }
}
