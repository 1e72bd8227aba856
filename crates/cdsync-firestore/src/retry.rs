//! Bounded retry with exponential backoff.
//!
//! The loop is independent of how time passes: delays go through a
//! [`Sleeper`], so tests can record them instead of waiting.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

// =============================================================================
// Policy
// =============================================================================

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after the failed attempt with 0-based index `attempt`:
    /// `base_delay * 2^attempt`, saturating instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

// =============================================================================
// Sleeping
// =============================================================================

/// Waits between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// Retry loop
// =============================================================================

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a recoverable error.
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error that is not worth retrying.
    Aborted { attempt: u32, error: E },
}

impl<E> RetryError<E> {
    /// The error that ended the loop.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted { error, .. } => error,
        }
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempt, .. } => *attempt,
        }
    }
}

/// Run `op` until it succeeds, fails unrecoverably, or attempts run out.
///
/// `op` receives the 0-based attempt index. After a recoverable failure with
/// attempts left, waits `policy.delay_for(attempt)` on `sleeper`.
pub async fn retry_with_backoff<T, E, F, Fut, S>(
    policy: &BackoffPolicy,
    sleeper: &S,
    is_recoverable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Sleeper + ?Sized,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        let error = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !is_recoverable(&error) {
            return Err(RetryError::Aborted {
                attempt: attempt + 1,
                error,
            });
        }

        if attempt + 1 >= attempts {
            return Err(RetryError::Exhausted {
                attempts,
                last: error,
            });
        }

        let delay = policy.delay_for(attempt);
        warn!(
            attempt = attempt + 1,
            max_attempts = attempts,
            delay_ms = delay.as_millis() as u64,
            "Attempt failed, retrying: {}",
            error
        );
        sleeper.sleep(delay).await;
        attempt += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
