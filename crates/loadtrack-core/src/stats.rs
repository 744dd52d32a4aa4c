//! Invocation statistics for a tracker.
//!
//! Counters are updated by the tracker's own trigger and finalization
//! paths; [`TrackerStats`] is a point-in-time snapshot of them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// Snapshot of a tracker's invocation history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
    /// Invocations started (by `trigger` or an accepted `try_trigger`).
    pub triggered: u64,
    /// Invocations whose deferred result resolved successfully.
    pub succeeded: u64,
    /// Invocations whose deferred result failed.
    pub failed: u64,
    /// Invocations whose future was dropped before it settled.
    pub abandoned: u64,
    /// Exclusive triggers refused because another invocation was outstanding.
    pub rejected: u64,
    /// Number of idle to in-flight transitions of the flag.
    pub busy_periods: u64,
    /// Invocations outstanding when the snapshot was taken.
    pub outstanding: usize,
}

impl TrackerStats {
    /// Invocations that have finished by any route.
    pub fn finished(&self) -> u64 {
        self.succeeded + self.failed + self.abandoned
    }
}

/// Live counters shared between a tracker and its in-flight guards.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    triggered: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
    rejected: AtomicU64,
    busy_periods: AtomicU64,
}

// ============================================================================
// Recording
// ============================================================================

impl Counters {
    pub(crate) fn record_triggered(&self, became_busy: bool) {
        self.triggered.fetch_add(1, Ordering::Relaxed);
        if became_busy {
            self.busy_periods.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_settled(&self, succeeded: bool) {
        if succeeded {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, outstanding: usize) -> TrackerStats {
        TrackerStats {
            triggered: self.triggered.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            busy_periods: self.busy_periods.load(Ordering::Relaxed),
            outstanding,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
