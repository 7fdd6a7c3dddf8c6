//! Outside collaborators of the control node
//!
//! The control cycle only talks to hardware through these traits. The firmware
//! implements them on top of the peripherals; tests implement them with scripted
//! values.

use heapless::Vec;

use crate::config::PIXY_MAX_BLOBS;
use crate::control::MovementCommand;
use crate::sensing::goal::Blob;

/// Camera blobs of one poll
pub type Blobs = Vec<Blob, PIXY_MAX_BLOBS>;

/// Compass
#[allow(async_fn_in_trait)]
pub trait HeadingSource {
    /// Heading in degrees, `[0, 360)`, 0 = towards the attacking goal
    async fn heading(&mut self) -> f32;
}

/// Camera
#[allow(async_fn_in_trait)]
pub trait VisionSource {
    /// Blobs detected since the last poll; empty when the camera has nothing
    async fn blobs(&mut self) -> Blobs;
}

/// Motor controller
pub trait Actuator {
    /// Applies one command; called once per cycle
    fn drive(&mut self, command: MovementCommand);
}
