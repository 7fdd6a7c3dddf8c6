//! Control node system components
//!
//! - [`state`]: play roles and peer reports
//! - [`play_mode`]: role negotiation
//! - [`context`]: the per-cycle state and step function
//! - [`timer`]: monotonic time and deadline timers
//! - [`io`]: hardware seams of the control cycle
//! - [`movement`], [`peer`], [`indicator`]: mailboxes between firmware tasks
pub mod context;
pub mod indicator;
pub mod io;
pub mod movement;
pub mod peer;
pub mod play_mode;
pub mod state;
pub mod timer;
