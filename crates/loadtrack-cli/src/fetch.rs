//! Simulated remote fetch used as the tracked operation.

use futures::FutureExt;
use loadtrack_core::{BoxOperationFuture, Operation};
use std::time::Duration;

use crate::config::{OperationConfig, Outcome};

/// Failure of a simulated fetch. Carries the configured error text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// A fetch that settles after a fixed delay with a fixed outcome.
///
/// Takes the attempt number as its only argument so log records can tell
/// concurrent invocations apart.
#[derive(Debug, Clone)]
pub struct SimulatedFetch {
    delay: Duration,
    outcome: Outcome,
    value: String,
    error: String,
}

impl SimulatedFetch {
    /// Build a fetch from the `[operation]` config section.
    pub fn from_config(config: &OperationConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            outcome: config.outcome,
            value: config.value.clone(),
            error: config.error.clone(),
        }
    }
}

impl Operation<(u32,)> for SimulatedFetch {
    type Output = String;
    type Error = FetchError;
    type Future = BoxOperationFuture<String, FetchError>;

    fn invoke(&self, (attempt,): (u32,)) -> Self::Future {
        let delay = self.delay;
        let result = match self.outcome {
            Outcome::Ok => Ok(self.value.clone()),
            Outcome::Error => Err(FetchError(self.error.clone())),
        };
        async move {
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "fetch started");
            tokio::time::sleep(delay).await;
            tracing::debug!(attempt, ok = result.is_ok(), "fetch settled");
            result
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(outcome: Outcome) -> OperationConfig {
        OperationConfig {
            delay_ms: 100,
            outcome,
            ..OperationConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_resolves_after_delay() {
        let fetch = SimulatedFetch::from_config(&config(Outcome::Ok));
        let started = tokio::time::Instant::now();

        assert_eq!(fetch.invoke((1,)).await, Ok("ok".to_string()));
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_fails_with_configured_error() {
        let fetch = SimulatedFetch::from_config(&config(Outcome::Error));
        let err = fetch.invoke((1,)).await.unwrap_err();
        assert_eq!(err, FetchError("network-down".into()));
        assert_eq!(err.to_string(), "network-down");
    }
}
