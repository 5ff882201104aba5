//! Bounded retry for metric source requests
//!
//! The retry policy is deliberately small: a fixed number of attempts
//! with a fixed cool-down, applied only to transient failures. Anything
//! past the last attempt escalates to the caller, which keeps a
//! rate-limited API from being hammered in a loop.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default cool-down between attempts
const DEFAULT_BACKOFF_SECS: u64 = 60;

/// Errors that may succeed on a second attempt
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Fixed-backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Cool-down between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

/// Run `op`, retrying transient failures under `policy`
///
/// Non-transient failures return immediately. The final attempt's error
/// is returned unchanged, so the caller sees the escalated failure.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    error = %err,
                    attempt,
                    cooldown_secs = policy.backoff.as_secs(),
                    "transient fetch failure, retrying after cool-down"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
