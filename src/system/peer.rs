//! Radio frame mailboxes
//!
//! The radio task and the control loop run independently. Frames cross between
//! them through two signals, each holding only the newest frame:
//! - [`RECEIVED`]: decoded peer reports, radio task to control loop
//! - [`OUTGOING`]: our own reports, control loop to radio task

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::link::radio::RadioFrame;

/// Newest report received from the peer
pub static RECEIVED: Signal<CriticalSectionRawMutex, RadioFrame> = Signal::new();

/// Newest report to send to the peer
pub static OUTGOING: Signal<CriticalSectionRawMutex, RadioFrame> = Signal::new();

/// Hands a received report to the control loop
pub fn received(frame: RadioFrame) {
    RECEIVED.signal(frame);
}

/// Takes the newest received report without waiting
pub fn take_received() -> Option<RadioFrame> {
    RECEIVED.try_take()
}

/// Queues a report for sending
pub fn send(frame: RadioFrame) {
    OUTGOING.signal(frame);
}

/// Waits for the next report to send
pub async fn wait_outgoing() -> RadioFrame {
    OUTGOING.wait().await
}
