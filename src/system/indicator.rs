//! Control node heartbeat LED
//!
//! [`RobotContext`](crate::system::context::RobotContext) reports when the
//! blink period has elapsed; [`Heartbeat`] keeps the LED level between cycles
//! and posts each new level for the LED task, which owns the pin. A stalled
//! control loop therefore shows up as a frozen LED.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Newest LED level
pub static LED_LEVEL: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Waits for the next LED level
pub async fn wait() -> bool {
    LED_LEVEL.wait().await
}

/// LED level owned by the control loop
#[derive(Debug, Default)]
pub struct Heartbeat {
    lit: bool,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self { lit: false }
    }

    /// Flips the LED when the cycle says the blink period is over
    ///
    /// Nothing is posted otherwise, so the LED task sleeps between blinks.
    pub fn beat(&mut self, due: bool) {
        if !due {
            return;
        }
        self.lit = !self.lit;
        LED_LEVEL.signal(self.lit);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
