//! Background Tasks Module
//!
//! Contains work that runs off the caller's thread.
//!
//! # Tasks
//! - Expired-entry sweep: dispatched by a successful read once the refresh cooldown has elapsed

mod sweep;

pub use sweep::{spawn_sweep, SweepHandle};
