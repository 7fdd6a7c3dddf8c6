//! Motor controller link
//!
//! Wheel mixing runs on the motor controller. This task forwards each movement
//! command as a 6-byte frame: start byte, angle (big-endian), speed, rotation
//! (big-endian, two's complement).

use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{self, UartTx};

use crate::control::MovementCommand;
use crate::system::movement;

const START: u8 = 0xFF;

fn encode(command: MovementCommand) -> [u8; 6] {
    let angle = command.angle.to_be_bytes();
    let rotation = command.rotation.to_be_bytes();
    [START, angle[0], angle[1], command.speed, rotation[0], rotation[1]]
}

#[embassy_executor::task]
pub async fn motor_forward(mut tx: UartTx<'static, UART1, uart::Async>) {
    loop {
        let command = movement::wait().await;
        if let Err(e) = tx.write(&encode(command)).await {
            log_warn!("motor: send failed {:?}", e);
        }
    }
}
