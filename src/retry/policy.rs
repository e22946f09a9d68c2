//! Retry budget, backoff and the pluggable pieces of the retry loop.

use rand::Rng;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Retry budget used when neither the engine nor the call overrides it.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Exponential backoff with bounded random jitter.
///
/// The delay before retry `i` (1-based) is `base * 2^(i-1)` plus a uniform
/// sample in `[0, jitter)`. The defaults give `2^(i-1)` seconds plus up to
/// one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            jitter: Duration::from_millis(1000),
        }
    }
}

impl Backoff {
    /// Creates a backoff with the given base delay and jitter bound.
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// A backoff that never waits.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Gets the base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Gets the jitter bound.
    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Delay before retry `retry`, without jitter. Zero for the first attempt.
    pub fn base_delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.checked_pow(retry - 1).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    /// Delay before retry `retry`, jitter included.
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if retry == 0 {
            return base;
        }

        let bound = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if bound == 0 {
            return base;
        }
        let jitter = rand::rng().random_range(0..bound);
        base.saturating_add(Duration::from_millis(jitter))
    }
}

/// Retry settings of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `1 + max_retries` sends at most.
    pub max_retries: u32,
    /// Delay schedule between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::default(),
        }
    }
}

/// Extra statuses to retry on top of 500 and 503.
pub trait RetryPredicate: Send + Sync {
    /// Returns true when a response with this status should be retried.
    fn should_retry(&self, status: StatusCode) -> bool;
}

impl<F> RetryPredicate for F
where
    F: Fn(StatusCode) -> bool + Send + Sync,
{
    fn should_retry(&self, status: StatusCode) -> bool {
        self(status)
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for Arc<T> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
