use extract::ExtractError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Errors that can say whether trying again is worthwhile.
pub trait Retryable: std::fmt::Display {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ExtractError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// Exponential backoff around generator calls. Permanent failures (a
/// rejected prompt, an unknown model) are returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    pub async fn retry<F, Fut, T, E>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let e = match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation, attempts = attempt + 1, "Generator answered after retries");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            attempt += 1;
            if !e.is_retryable() {
                warn!(operation, attempts = attempt, error = %e, "Permanent generator failure");
                return Err(e);
            }
            if attempt > self.max_retries {
                warn!(operation, attempts = attempt, error = %e, "Generator still failing, giving up");
                return Err(e);
            }

            warn!(
                operation,
                attempt,
                max_retries = self.max_retries,
                backoff_ms = backoff.as_millis(),
                error = %e,
                "Generator failed, retrying"
            );
            sleep(backoff).await;
            backoff = std::cmp::min(backoff * 2, self.max_backoff);
        }
    }
}
