//! Bounded exponential backoff for idempotent reads.

use backoff::backoff::Backoff;
use std::future::Future;
use tracing::{debug, warn};

use crate::config::RetrySettings;
use crate::error::ClientResult;

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `settings.max_attempts` attempts have been made.
pub async fn with_backoff<T, F, Fut>(
    settings: &RetrySettings,
    operation: &str,
    mut op: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut backoff = settings.create_backoff();
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < settings.max_attempts => {
                let Some(delay) = backoff.next_backoff() else {
                    return Err(e);
                };
                debug!(operation, attempt, ?delay, error = %e, "Retrying after backoff");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(operation, attempts = attempt, error = %e, "Giving up after retries");
                }
                return Err(e);
            }
        }
    }
}
