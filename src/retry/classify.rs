//! Classification of a finished attempt.
//!
//! Retries are reserved for conditions plausibly caused by transient server
//! overload: statuses 500 and 503 (plus whatever the optional
//! [`RetryPredicate`] flags) and handshake/connection timeouts. Client
//! errors are deterministic and are never retried.

use super::policy::RetryPredicate;
use crate::http::TransportError;

use reqwest::StatusCode;
use std::fmt;
use std::sync::Arc;

/// What the retry loop should do with an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// 2xx without transport error.
    Success,
    /// Transient failure, worth another attempt if budget remains.
    Retryable,
    /// Failure that would only repeat.
    Terminal,
}

/// Maps a status code and transport error to a [`Classification`].
#[derive(Clone, Default)]
pub struct ResponseClassifier {
    predicate: Option<Arc<dyn RetryPredicate>>,
}

impl fmt::Debug for ResponseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseClassifier")
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl ResponseClassifier {
    /// Creates a classifier using only the built-in 500/503 rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier that also retries statuses flagged by `predicate`.
    pub fn with_predicate(predicate: Arc<dyn RetryPredicate>) -> Self {
        Self {
            predicate: Some(predicate),
        }
    }

    /// Returns true when a response with this status should be retried.
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        status == StatusCode::INTERNAL_SERVER_ERROR
            || status == StatusCode::SERVICE_UNAVAILABLE
            || self
                .predicate
                .as_ref()
                .is_some_and(|predicate| predicate.should_retry(status))
    }

    /// Classifies an attempt. `status` is `None` when no response was
    /// obtained.
    pub fn classify(
        &self,
        status: Option<StatusCode>,
        error: Option<&TransportError>,
    ) -> Classification {
        if status.is_some_and(|status| self.is_retryable_status(status)) {
            return Classification::Retryable;
        }

        match (status, error) {
            (_, Some(error)) if error.kind().is_retryable() => Classification::Retryable,
            (_, Some(_)) => Classification::Terminal,
            (Some(status), None) if status.is_success() => Classification::Success,
            _ => Classification::Terminal,
        }
    }
}
