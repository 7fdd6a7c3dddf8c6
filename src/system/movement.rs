//! Movement command mailbox
//!
//! Hands the latest movement command from the control loop to the motor task.
//! Only the newest command matters, so an unread command is simply replaced.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::control::MovementCommand;
use crate::system::io::Actuator;

/// Latest movement command
pub static MOVEMENT: Signal<CriticalSectionRawMutex, MovementCommand> = Signal::new();

/// Publishes a new movement command
pub fn update(command: MovementCommand) {
    MOVEMENT.signal(command);
}

/// Waits for the next movement command
pub async fn wait() -> MovementCommand {
    MOVEMENT.wait().await
}

/// Actuator that hands every command to the motor task
pub struct MovementMailbox;

impl Actuator for MovementMailbox {
    fn drive(&mut self, command: MovementCommand) {
        update(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_command_wins() {
        update(MovementCommand {
            angle: 10,
            speed: 100,
            rotation: 0,
        });
        update(MovementCommand::STOP);
        assert_eq!(embassy_futures::block_on(wait()), MovementCommand::STOP);
        assert!(!MOVEMENT.signaled());

        MovementMailbox.drive(MovementCommand {
            angle: 90,
            speed: 200,
            rotation: -5,
        });
        assert_eq!(embassy_futures::block_on(wait()).angle, 90);
    }
}
