//! Fixed-count, fixed-delay retry loop shared by every `*_with_retry` call.

use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::HttpLightError;

/// Default number of attempts for retried calls.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between attempts in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 5000;

/// How many times a call is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A `max_attempts` of zero is treated as one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_millis(max_attempts: u32, delay_ms: u64) -> Self {
        Self::new(max_attempts, Duration::from_millis(delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_millis(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY_MS)
    }
}

/// Runs `operation` until it succeeds or the policy's attempt budget is spent.
///
/// Any error counts as a failed attempt. Attempts run strictly one after the
/// other with `policy.delay()` between them; there is no delay before the first
/// attempt or after the last one. When the budget is spent the last error is
/// returned inside [`HttpLightError::RetryExhausted`].
///
/// Cancelling `cancel` while waiting between attempts, or an attempt that
/// itself ends in [`HttpLightError::Cancelled`], stops the loop with
/// [`HttpLightError::Cancelled`].
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, HttpLightError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpLightError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(HttpLightError::Cancelled) => {
                debug!("{}: cancelled during attempt {}", operation_name, attempt);
                return Err(HttpLightError::Cancelled);
            }
            Err(e) => e,
        };

        if attempt >= max_attempts {
            debug!(
                "{}: giving up after {} attempts, last error: {}",
                operation_name, attempt, error
            );
            return Err(HttpLightError::RetryExhausted {
                attempts: attempt,
                last_error: Box::new(error),
            });
        }

        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
            operation_name,
            attempt,
            max_attempts,
            error,
            policy.delay().as_millis()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("{}: cancelled while waiting to retry", operation_name);
                return Err(HttpLightError::Cancelled);
            }
            _ = tokio::time::sleep(policy.delay()) => {}
        }
    }
}
