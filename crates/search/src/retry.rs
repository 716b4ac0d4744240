//! Bounded exponential-backoff retry for search engine calls

use crate::error::SearchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff before attempt `attempt + 1` (1-based), jittered by a uniform
/// factor in [0.9, 1.1] so synchronized clients do not retry in lockstep.
pub(crate) fn jittered_backoff(base_delay: Duration, attempt: usize) -> Duration {
    let exp = base_delay.as_millis() as f64 * 2f64.powi(attempt.saturating_sub(1) as i32);
    let jitter = rand::rng().random_range(0.9..=1.1);
    Duration::from_millis((exp * jitter) as u64)
}

/// Run `operation` with bounded exponential-backoff retry.
///
/// Retryable errors (transport failures, timeouts, 5xx statuses) are
/// retried up to `max_attempts` total invocations; fatal errors
/// propagate immediately. The last error is returned once attempts are
/// exhausted.
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    max_attempts: usize,
    base_delay: Duration,
) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let backoff = jittered_backoff(base_delay, attempt);
                warn!("Search request failed (attempt {attempt}/{max_attempts}), retrying in {backoff:?}: {e}");
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
