//! Bounded retry with a per-attempt timeout.

use std::time::Duration;

use thiserror::Error;

/// Retry configuration for external collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts before giving up.
    pub attempts: u32,
    /// Budget for each individual attempt.
    pub per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            per_attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt count and timeout.
    pub fn new(attempts: u32, per_attempt_timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            per_attempt_timeout,
        }
    }
}

/// The terminal outcome of an exhausted retry loop.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The final attempt ran past its timeout.
    #[error("operation timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },

    /// The final attempt failed with the operation's own error.
    #[error("operation failed after {attempts} attempts: {source}")]
    Failed { attempts: u32, source: E },
}

/// Runs `op` up to `policy.attempts` times, bounding each attempt with
/// `policy.per_attempt_timeout`.
///
/// Returns the first success, or the outcome of the final attempt once
/// the bound is exhausted.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: RetryPolicy,
    mut op: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut last = None;

    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.per_attempt_timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                tracing::debug!(attempt, error = %e, "retried operation failed");
                last = Some(RetryError::Failed {
                    attempts,
                    source: e,
                });
            }
            Err(_) => {
                tracing::debug!(attempt, "retried operation timed out");
                last = Some(RetryError::TimedOut { attempts });
            }
        }
    }

    // The loop always runs at least once, so `last` is populated.
    Err(last.expect("at least one attempt"))
}
