#![cfg_attr(not(test), no_std)]

//! soccer-robot - perception and control core for a two-robot soccer team
//!
//! The crate holds everything that decides how the robot moves. Hardware access
//! sits behind the collaborator traits in [`system::io`] so the whole pipeline
//! runs on the host in tests.
//!
//! # Layout
//! - [`sensing`]: IR ball sensor array, line tracker, goal tracker, heading rate
//! - [`link`]: sensing-node command channel and the inter-robot radio frame
//! - [`control`]: control laws producing one [`control::MovementCommand`] per cycle
//! - [`system`]: play-mode negotiation, timers, mailboxes and the per-cycle context
//! - `task` (feature `firmware`): embassy tasks for the RP2350 nodes

#[macro_use]
pub mod logging;

pub mod angle;
pub mod config;
pub mod control;
pub mod link;
pub mod sensing;
pub mod system;

#[cfg(feature = "firmware")]
pub mod task;
