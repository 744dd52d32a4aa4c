//! Error types for Loadtrack operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! the Loadtrack crates. Uses `thiserror` for derive macros.
//!
//! Failures of a wrapped [`Operation`](crate::Operation) never pass through
//! this type. A tracker hands the operation's own error back to the caller
//! untouched; the variants here cover the tracker's exclusive mode and the
//! tooling built around it.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in Loadtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An exclusive trigger was refused because an invocation is outstanding.
    #[error("Operation busy: {outstanding} invocation(s) already in flight")]
    Busy {
        /// Number of invocations outstanding at the time of the refusal.
        outstanding: usize,
    },

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Create a busy error.
    pub fn busy(outstanding: usize) -> Self {
        Self::Busy { outstanding }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Wrap an I/O error with the path that produced it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error is an exclusive-trigger refusal.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Result type alias using Loadtrack's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_display() {
        let err = Error::busy(2);
        assert!(err.is_busy());
        assert_eq!(
            err.to_string(),
            "Operation busy: 2 invocation(s) already in flight"
        );
    }

    #[test]
    fn test_config_display() {
        let err = Error::config("bad mode");
        assert!(!err.is_busy());
        assert_eq!(err.to_string(), "Configuration error: bad mode");
    }

    #[test]
    fn test_io_with_path_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_path(io, "/tmp/missing.toml");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.toml"));
        assert!(msg.contains("gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
