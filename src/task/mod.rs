//! Embassy tasks of the two nodes
//!
//! Control node:
//! - [`control_loop`]: the control cycle, on top of [`compass`], [`camera`] and [`node_link`]
//! - [`radio`]: peer reports in and out
//! - [`motor_forward`]: movement commands to the motor controller
//! - [`led_indicate`]: indicator LED
//!
//! Sensing node:
//! - [`tsop_sample`]: IR receiver sampling
//! - [`link_respond`]: SPI slave answering the control node
//! - [`led_indicate`]: heartbeat LED
pub mod bus;
pub mod camera;
pub mod compass;
pub mod control_loop;
pub mod led_indicate;
pub mod link_respond;
pub mod motor_forward;
pub mod node_link;
pub mod radio;
pub mod tsop_sample;
