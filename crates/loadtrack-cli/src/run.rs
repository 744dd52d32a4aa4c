//! Handler for `loadtrack run`.
//!
//! Wraps a [`SimulatedFetch`] in a [`LoadingTracker`], issues the configured
//! triggers, and watches the flag the way a presentation layer would.

use futures::future::join_all;
use loadtrack_core::{InFlightFlag, LoadingTracker, TrackerStats};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{LoadtrackConfig, RunMode};
use crate::fetch::SimulatedFetch;

// ============================================================================
// Report types
// ============================================================================

/// Everything observed during one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Operation label.
    pub label: String,
    /// Trigger mode used.
    pub mode: RunMode,
    /// One entry per trigger, in attempt order.
    pub attempts: Vec<Attempt>,
    /// Flag values seen by the watcher, in order.
    pub transitions: Vec<bool>,
    /// Tracker counters at the end of the run.
    pub stats: TrackerStats,
}

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    /// 1-based attempt number.
    pub attempt: u32,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Settlement of one trigger as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AttemptOutcome {
    /// The fetch resolved.
    Ok {
        /// Resolved value.
        value: String,
    },
    /// The fetch failed; the error is passed through unchanged.
    Failed {
        /// Error text.
        error: String,
    },
    /// The exclusive trigger was refused.
    Refused {
        /// Invocations outstanding at refusal.
        outstanding: usize,
    },
}

impl AttemptOutcome {
    fn from_result(result: Result<String, crate::fetch::FetchError>) -> Self {
        match result {
            Ok(value) => Self::Ok { value },
            Err(e) => Self::Failed { error: e.0 },
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// Run the configured triggers and collect what was observed.
///
/// Before awaiting a busy period the runner waits for the watcher to log
/// the raise, and after it settles for the watcher to log the lowering.
/// `transitions` therefore holds every edge on any runtime flavor.
pub async fn run_operation(config: &LoadtrackConfig) -> RunReport {
    let tracker = LoadingTracker::new(SimulatedFetch::from_config(&config.operation))
        .with_label(config.operation.label.clone());
    let mut watcher = Watcher::spawn(tracker.label().to_string(), tracker.flag());
    let mut edges = 0;

    let attempts = 1..=config.run.triggers;
    let attempts = match config.run.mode {
        RunMode::Sequential => {
            let mut out = Vec::new();
            for attempt in attempts {
                let pending = tracker.trigger((attempt,));
                edges += 1;
                watcher.caught_up(edges).await;

                let result = pending.await;
                edges += 1;
                watcher.caught_up(edges).await;

                out.push(Attempt {
                    attempt,
                    outcome: AttemptOutcome::from_result(result),
                });
            }
            out
        }
        RunMode::Concurrent => {
            let pending: Vec<_> = attempts
                .map(|attempt| {
                    let fut = tracker.trigger((attempt,));
                    async move { (attempt, fut.await) }
                })
                .collect();
            if !pending.is_empty() {
                edges += 1;
                watcher.caught_up(edges).await;
            }

            let out = join_all(pending)
                .await
                .into_iter()
                .map(|(attempt, result)| Attempt {
                    attempt,
                    outcome: AttemptOutcome::from_result(result),
                })
                .collect();
            if edges > 0 {
                edges += 1;
                watcher.caught_up(edges).await;
            }
            out
        }
        RunMode::Exclusive => {
            let mut refused = Vec::new();
            let mut accepted = Vec::new();
            for attempt in attempts {
                match tracker.try_trigger((attempt,)) {
                    Ok(fut) => accepted.push(async move { (attempt, fut.await) }),
                    Err(loadtrack_core::Error::Busy { outstanding }) => refused.push(Attempt {
                        attempt,
                        outcome: AttemptOutcome::Refused { outstanding },
                    }),
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "unexpected trigger error");
                    }
                }
            }
            if !accepted.is_empty() {
                edges += 1;
                watcher.caught_up(edges).await;
            }

            let mut out: Vec<Attempt> = join_all(accepted)
                .await
                .into_iter()
                .map(|(attempt, result)| Attempt {
                    attempt,
                    outcome: AttemptOutcome::from_result(result),
                })
                .chain(refused)
                .collect();
            if edges > 0 {
                edges += 1;
                watcher.caught_up(edges).await;
            }
            out.sort_by_key(|a| a.attempt);
            out
        }
    };

    let stats = tracker.stats();
    let label = tracker.label().to_string();
    drop(tracker);

    RunReport {
        label,
        mode: config.run.mode,
        attempts,
        transitions: watcher.finish().await,
        stats,
    }
}

// ============================================================================
// Watcher
// ============================================================================

/// Task that logs every flag transition until the tracker is gone.
struct Watcher {
    task: JoinHandle<Vec<bool>>,
    logged: watch::Receiver<usize>,
}

impl Watcher {
    fn spawn(label: String, mut flag: InFlightFlag) -> Self {
        let (logged_tx, logged) = watch::channel(0);
        let task = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(in_flight) = flag.changed().await {
                if in_flight {
                    tracing::info!(label = %label, outstanding = flag.outstanding(), "loading");
                } else {
                    tracing::info!(label = %label, "idle");
                }
                seen.push(in_flight);
                logged_tx.send_replace(seen.len());
            }
            seen
        });
        Self { task, logged }
    }

    /// Wait until `count` transitions have been logged.
    async fn caught_up(&mut self, count: usize) {
        // Fails only if the task is gone; `finish` reports that.
        let _ = self.logged.wait_for(|n| *n >= count).await;
    }

    /// Collect the transitions once the tracker has been dropped.
    async fn finish(self) -> Vec<bool> {
        match self.task.await {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!(error = %e, "flag watcher failed");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a report as human-readable lines.
pub fn render_report(report: &RunReport) -> String {
    let mut lines = Vec::new();
    for attempt in &report.attempts {
        let line = match &attempt.outcome {
            AttemptOutcome::Ok { value } => format!("[{}] ok: {value}", attempt.attempt),
            AttemptOutcome::Failed { error } => format!("[{}] failed: {error}", attempt.attempt),
            AttemptOutcome::Refused { outstanding } => format!(
                "[{}] refused: {outstanding} already in flight",
                attempt.attempt
            ),
        };
        lines.push(line);
    }
    let s = &report.stats;
    lines.push(format!(
        "{}: {} triggered, {} succeeded, {} failed, {} refused, {} busy period(s)",
        report.label, s.triggered, s.succeeded, s.failed, s.rejected, s.busy_periods
    ));
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
