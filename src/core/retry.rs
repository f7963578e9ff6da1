use crate::adapters::http::endpoints::Endpoint;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub attempts: u32,
    pub delay: Duration,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
            backoff_factor: 1.0,
        }
    }

    /// Backoff before retry number `attempt`, never longer than
    /// [`MAX_RETRY_DELAY`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let seconds = self.delay.as_secs_f64() * self.backoff_factor.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(250),
            backoff_factor: 2.0,
        }
    }
}

/// Runs `op` again after transport failures, but only for endpoints that are
/// safe to repeat. The repository never calls this on its own; callers opt
/// in per operation.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, endpoint: &Endpoint, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if endpoint.is_retryable() && err.is_retryable() && attempt < policy.attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    endpoint = endpoint.name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying after transport failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
