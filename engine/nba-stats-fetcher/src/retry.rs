//! Retry with exponential backoff for transient fetch errors

use crate::config::RetryConfig;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `f` until it succeeds, fails permanently or runs out of retries
///
/// Delays grow by the backoff multiplier up to the configured maximum.
pub async fn run_with_retry<F, Fut, T>(mut f: F, retry_config: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = Duration::from_millis(retry_config.initial_delay_ms);
    let max_delay = Duration::from_millis(retry_config.max_delay_ms);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt > retry_config.max_retries || !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!("Attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                sleep(delay).await;

                // Exponential backoff
                delay = delay.mul_f64(retry_config.backoff_multiplier).min(max_delay);
            }
        }
    }
}
