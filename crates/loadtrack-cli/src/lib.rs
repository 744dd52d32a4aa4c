//! Command-line harness for Loadtrack.
//!
//! Wraps a simulated fetch in a [`loadtrack_core::LoadingTracker`] and
//! reports what a presentation layer watching the in-flight flag would see.
//!
//! # Key Abstractions
//!
//! - [`LoadtrackCli`]: loads configuration and dispatches commands
//! - [`SimulatedFetch`]: the tracked operation
//! - [`run::run_operation`]: trigger modes and the flag watcher

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod fetch;
pub mod run;

pub use app::LoadtrackCli;
pub use cli::CliArgs;
pub use config::LoadtrackConfig;
pub use fetch::{FetchError, SimulatedFetch};
