//! Perception
//!
//! Everything that turns raw sensor data into observations the control laws can use:
//! - [`ball`]: IR receiver ring to ball bearing and strength
//! - [`line`]: line sensor readings to an on-field/off-field estimate
//! - [`goal`]: camera blobs to goal angle and distance
//! - [`heading`]: compass heading to heading rate
//! - [`rank`]: bounded ranking used by the ball pipeline

pub mod ball;
pub mod goal;
pub mod heading;
pub mod line;
pub mod rank;
