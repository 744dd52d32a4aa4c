//! Loadtrack Core: in-flight tracking for asynchronous operations.
//!
//! This crate wraps any asynchronous operation with a boolean "busy"
//! indicator that is raised when the operation is triggered and lowered
//! on every exit path once its deferred result settles.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`flag`]: The read-only in-flight flag
//! - [`stats`]: Invocation counters
//! - [`tracker`]: The loading tracker
//! - [`traits`]: The operation capability

#![doc = include_str!("../README.md")]

pub mod error;
pub mod flag;
pub mod stats;
pub mod tracker;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use flag::InFlightFlag;
pub use stats::TrackerStats;
pub use tracker::{LoadingTracker, track};
pub use traits::{BoxOperationFuture, Operation};
