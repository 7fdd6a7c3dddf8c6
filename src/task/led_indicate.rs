//! Indicator LED tasks
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::system::indicator;

/// Follows the control loop's heartbeat
#[embassy_executor::task]
pub async fn led_indicate(mut led: Output<'static>) {
    loop {
        if indicator::wait().await {
            led.set_high();
        } else {
            led.set_low();
        }
    }
}

/// Free-running heartbeat, toggled every `period_us`
#[embassy_executor::task]
pub async fn led_blink(mut led: Output<'static>, period_us: u64) {
    loop {
        led.toggle();
        Timer::after(Duration::from_micros(period_us)).await;
    }
}
