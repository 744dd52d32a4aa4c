//! The loading tracker.
//!
//! [`LoadingTracker`] wraps one [`Operation`] and associates an
//! [`InFlightFlag`] with it, so call sites never manage a "busy" boolean
//! by hand.
//!
//! # Lifecycle of one invocation
//!
//! ```text
//! Idle ──trigger()──▶ InFlight ──future settles──▶ Settled (flag lowered)
//! ```
//!
//! The flag is raised synchronously inside `trigger`, before the operation
//! is invoked. It is lowered when the returned future settles, before the
//! result is handed back to the caller, so a caller that has observed the
//! result also observes the lowered flag. Dropping the returned future
//! before it settles also lowers the flag.
//!
//! # Concurrent triggers
//!
//! `trigger` may be called while earlier invocations are outstanding. The
//! flag counts outstanding invocations and stays raised until the last one
//! finishes, so an early settlement never clears the flag for a slower
//! sibling. Callers that want at most one outstanding invocation use
//! [`LoadingTracker::try_trigger`], which refuses with
//! [`Error::Busy`](crate::Error::Busy) instead of starting a second one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::flag::{FlagCell, InFlightFlag, InFlightGuard};
use crate::stats::{Counters, TrackerStats};
use crate::traits::Operation;

const DEFAULT_LABEL: &str = "operation";

// ============================================================================
// LoadingTracker
// ============================================================================

/// Wraps an asynchronous operation with an in-flight flag.
///
/// # Example
///
/// ```
/// use loadtrack_core::LoadingTracker;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tracker = LoadingTracker::new(|(): ()| async { Err::<(), _>("network-down") })
///     .with_label("fetch-projects");
///
/// let pending = tracker.trigger(());
/// assert!(tracker.is_in_flight());
///
/// assert_eq!(pending.await, Err("network-down"));
/// assert!(!tracker.is_in_flight());
/// # }
/// ```
pub struct LoadingTracker<O> {
    operation: O,
    label: Arc<str>,
    cell: Arc<FlagCell>,
    counters: Arc<Counters>,
}

/// Wrap `operation` and return the tracker together with its flag.
///
/// Equivalent to building a [`LoadingTracker`] and calling
/// [`flag`](LoadingTracker::flag) on it.
pub fn track<O>(operation: O) -> (LoadingTracker<O>, InFlightFlag) {
    let tracker = LoadingTracker::new(operation);
    let flag = tracker.flag();
    (tracker, flag)
}

impl<O> LoadingTracker<O> {
    /// Wrap an operation. The flag starts idle.
    pub fn new(operation: O) -> Self {
        Self {
            operation,
            label: Arc::from(DEFAULT_LABEL),
            cell: Arc::new(FlagCell::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Set the label used in log records.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Arc::from(label.into());
        self
    }

    /// The label used in log records.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// A read-only handle to this tracker's flag.
    pub fn flag(&self) -> InFlightFlag {
        self.cell.reader()
    }

    /// Whether at least one invocation is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.cell.outstanding() > 0
    }

    /// Number of invocations outstanding.
    pub fn outstanding(&self) -> usize {
        self.cell.outstanding()
    }

    /// Snapshot of this tracker's invocation counters.
    pub fn stats(&self) -> TrackerStats {
        self.counters.snapshot(self.cell.outstanding())
    }

    /// Start an invocation.
    ///
    /// Raises the flag, invokes the operation with `args`, and returns a
    /// future that resolves to exactly what the operation's future resolves
    /// to. The tracker never inspects, wraps or recovers from the
    /// operation's error.
    ///
    /// The returned future does not borrow the tracker.
    pub fn trigger<Args>(
        &self,
        args: Args,
    ) -> impl Future<Output = std::result::Result<O::Output, O::Error>> + use<O, Args>
    where
        O: Operation<Args>,
    {
        let guard = InFlightGuard::enter(&self.cell, &self.counters, &self.label);
        log::debug!("{}: triggered ({} in flight)", self.label, self.outstanding());
        settle_with(guard, self.operation.invoke(args))
    }

    /// Start an invocation only if none is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`](crate::Error::Busy) without invoking the
    /// operation if another invocation has not settled yet.
    pub fn try_trigger<Args>(
        &self,
        args: Args,
    ) -> crate::Result<impl Future<Output = std::result::Result<O::Output, O::Error>> + use<O, Args>>
    where
        O: Operation<Args>,
    {
        let guard = InFlightGuard::enter_exclusive(&self.cell, &self.counters, &self.label)?;
        log::debug!("{}: triggered exclusively", self.label);
        Ok(settle_with(guard, self.operation.invoke(args)))
    }
}

/// Drive `pending` to completion, then release `guard`.
///
/// If the returned future is dropped first, the guard is dropped with it.
fn settle_with<F, T, E>(
    guard: InFlightGuard,
    pending: F,
) -> impl Future<Output = std::result::Result<T, E>>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    async move {
        let result = pending.await;
        guard.settle(result.is_ok());
        result
    }
}

impl<O> fmt::Debug for LoadingTracker<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingTracker")
            .field("label", &self.label)
            .field("outstanding", &self.cell.outstanding())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
