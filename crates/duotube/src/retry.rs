// Retry with bounded exponential backoff, used by the mirror adapter when it
// moves from one instance to the next.

use rand::RngExt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{Result, SourceError};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Base delay between attempts. Actual delay = base * 2^attempt + jitter.
    pub base_delay: Duration,
    /// Hard cap on the computed delay.
    pub max_delay: Duration,
    /// Adds random jitter of [0, base_delay/2).
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Back-to-back attempts without sleeping.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay after the given (0-indexed) failed attempt, never above `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // pools hold a handful of mirrors, so the exponent stays small
        let doubled = self.base_delay.saturating_mul(1 << attempt.min(16));
        let jitter = if self.jitter {
            self.base_delay.mul_f64(rand::rng().random_range(0.0..0.5))
        } else {
            Duration::ZERO
        };
        doubled.saturating_add(jitter).min(self.max_delay)
    }
}

/// Outcome of one attempt.
pub enum RetryAction<T> {
    Success(T),
    /// Worth another attempt.
    Retry(SourceError),
    /// Give up immediately.
    Fail(SourceError),
}

/// Runs `operation` up to `max_attempts` times, sleeping per `policy` in between.
///
/// Returns the last retryable error once attempts run out.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    max_attempts: usize,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
{
    let max_attempts = u32::try_from(max_attempts.max(1)).unwrap_or(u32::MAX);
    let mut attempt = 0u32;
    loop {
        match operation(attempt).await {
            RetryAction::Success(value) => return Ok(value),
            RetryAction::Fail(err) => return Err(err),
            RetryAction::Retry(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt - 1);
                warn!(
                    attempt,
                    max = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after transient error"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
