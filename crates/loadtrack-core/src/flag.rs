//! The in-flight flag and the guard that maintains it.
//!
//! A tracker owns a [`FlagCell`] holding the number of outstanding
//! invocations. Each invocation holds an [`InFlightGuard`] from the moment it
//! is triggered until it finishes; the guard's `Drop` lowers the count on
//! every exit path, including a future that is dropped before it settles.
//!
//! Readers get an [`InFlightFlag`], which can observe the flag but never
//! change it. The flag is `true` while at least one invocation is
//! outstanding.

use std::sync::Arc;

use tokio::sync::watch;

use crate::stats::Counters;

// ============================================================================
// FlagCell
// ============================================================================

/// Owner-side state: the outstanding-invocation count.
///
/// Receivers are only notified on idle/busy transitions, not on every
/// change of the count.
#[derive(Debug)]
pub(crate) struct FlagCell {
    outstanding: watch::Sender<usize>,
}

impl FlagCell {
    pub(crate) fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self { outstanding }
    }

    pub(crate) fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    pub(crate) fn reader(&self) -> InFlightFlag {
        InFlightFlag {
            rx: self.outstanding.subscribe(),
        }
    }

    /// Count one more invocation. Returns `true` if the flag went idle -> busy.
    fn raise(&self) -> bool {
        self.outstanding.send_if_modified(|n| {
            *n += 1;
            *n == 1
        })
    }

    /// Count one more invocation only if none is outstanding.
    ///
    /// Returns the current count on refusal.
    fn raise_exclusive(&self) -> std::result::Result<(), usize> {
        let mut current = 0;
        let raised = self.outstanding.send_if_modified(|n| {
            if *n == 0 {
                *n = 1;
                true
            } else {
                current = *n;
                false
            }
        });
        if raised { Ok(()) } else { Err(current) }
    }

    /// Count one invocation as finished. Returns `true` if the flag went busy -> idle.
    fn lower(&self) -> bool {
        self.outstanding.send_if_modified(|n| {
            if *n == 0 {
                return false;
            }
            *n -= 1;
            *n == 0
        })
    }
}

// ============================================================================
// InFlightFlag
// ============================================================================

/// Read-only view of a tracker's busy state.
///
/// Cheap to clone; every clone observes the same tracker. Intended for a
/// presentation layer that decides whether to render a loading indicator.
///
/// # Example
///
/// ```
/// use loadtrack_core::track;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tracker, flag) = track(|(name,): (&'static str,)| async move {
///     Ok::<_, String>(name.len())
/// });
///
/// assert!(!flag.get());
/// let pending = tracker.trigger(("projects",));
/// assert!(flag.get());
///
/// assert_eq!(pending.await, Ok(8));
/// assert!(!flag.get());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InFlightFlag {
    rx: watch::Receiver<usize>,
}

impl InFlightFlag {
    /// Whether at least one invocation is outstanding.
    pub fn get(&self) -> bool {
        *self.rx.borrow() > 0
    }

    /// Number of invocations outstanding right now.
    pub fn outstanding(&self) -> usize {
        *self.rx.borrow()
    }

    /// Wait for the next idle/busy transition and return the new flag value.
    ///
    /// Transitions that happen while nobody is waiting may be coalesced:
    /// a busy period that starts and ends between two calls is reported
    /// once, with the value current at wake-up. Returns `None` once the
    /// tracker and all of its invocations have been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update() > 0)
    }

    /// Wait until no invocation is outstanding.
    ///
    /// Returns immediately if the flag is already idle. If an invocation
    /// never settles this never returns.
    pub async fn wait_idle(&mut self) {
        // A closed channel means the tracker and every guard are gone.
        let _ = self.rx.wait_for(|n| *n == 0).await;
    }
}

// ============================================================================
// InFlightGuard
// ============================================================================

/// Held by one invocation from trigger until it finishes.
pub(crate) struct InFlightGuard {
    cell: Arc<FlagCell>,
    counters: Arc<Counters>,
    label: Arc<str>,
    settled: bool,
}

impl InFlightGuard {
    /// Raise the flag for a new invocation.
    pub(crate) fn enter(cell: &Arc<FlagCell>, counters: &Arc<Counters>, label: &Arc<str>) -> Self {
        let became_busy = cell.raise();
        counters.record_triggered(became_busy);
        Self::new(cell, counters, label)
    }

    /// Raise the flag only if the tracker is idle.
    pub(crate) fn enter_exclusive(
        cell: &Arc<FlagCell>,
        counters: &Arc<Counters>,
        label: &Arc<str>,
    ) -> crate::Result<Self> {
        match cell.raise_exclusive() {
            Ok(()) => {
                counters.record_triggered(true);
                Ok(Self::new(cell, counters, label))
            }
            Err(outstanding) => {
                counters.record_rejected();
                log::debug!("{label}: exclusive trigger refused, {outstanding} in flight");
                Err(crate::Error::busy(outstanding))
            }
        }
    }

    fn new(cell: &Arc<FlagCell>, counters: &Arc<Counters>, label: &Arc<str>) -> Self {
        Self {
            cell: Arc::clone(cell),
            counters: Arc::clone(counters),
            label: Arc::clone(label),
            settled: false,
        }
    }

    /// Record the settlement outcome and lower the flag.
    pub(crate) fn settle(mut self, succeeded: bool) {
        self.settled = true;
        self.counters.record_settled(succeeded);
        log::trace!(
            "{}: settled {}",
            self.label,
            if succeeded { "ok" } else { "with error" }
        );
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.counters.record_abandoned();
            log::debug!("{}: invocation dropped before settling", self.label);
        }
        if self.cell.lower() {
            log::trace!("{}: idle", self.label);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
