//! Retry execution.
//!
//! - [`policy`] - retry budget, [`Backoff`], and the [`RetryPredicate`] and
//!   [`Sleeper`] extension points
//! - [`classify`] - [`ResponseClassifier`], attempt to [`Classification`]
//! - [`executor`] - [`RetryExecutor`], the blocking send loop
//!
//! # Examples
//!
//! ```rust
//! use courier::retry::Backoff;
//! use std::time::Duration;
//!
//! let backoff = Backoff::default();
//! assert_eq!(backoff.base_delay(1), Duration::from_secs(1));
//! assert_eq!(backoff.base_delay(3), Duration::from_secs(4));
//! ```

pub mod classify;
pub mod executor;
pub mod policy;

pub use classify::{Classification, ResponseClassifier};
pub use executor::{Attempt, Outcome, RetryExecutor};
pub use policy::{
    Backoff, RetryPolicy, RetryPredicate, Sleeper, ThreadSleeper, DEFAULT_MAX_RETRIES,
};
