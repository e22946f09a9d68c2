//! The send loop.
//!
//! [`RetryExecutor::run`] performs up to `1 + max_retries` attempts. Before
//! every retry it blocks the calling thread for the backoff delay, re-arms
//! the replayable body and sends again. The loop has a single exit: the
//! first attempt that is not retryable, or the last attempt of the budget
//! whatever its classification.

use super::classify::{Classification, ResponseClassifier};
use super::policy::{Backoff, Sleeper};
use crate::http::{Transport, TransportError, TransportErrorKind};
use crate::request::PreparedRequest;
use crate::response::ResponseInfo;

use bytes::Bytes;
use reqwest::StatusCode;
use std::io::Read;
use tracing::{debug, info, warn};

/// One finished send attempt, response body buffered.
#[derive(Debug)]
pub enum Attempt {
    /// No response was obtained.
    Failed(TransportError),
    /// A response was obtained. `error` is set when reading its body failed.
    Received {
        /// Status, headers and the body read so far.
        response: ResponseInfo,
        /// Failure while reading the body, if any.
        error: Option<TransportError>,
    },
}

impl Attempt {
    /// Status code, `None` when no response was obtained.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Failed(_) => None,
            Self::Received { response, .. } => Some(response.status),
        }
    }

    /// Transport failure, if any.
    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Received { error, .. } => error.as_ref(),
        }
    }
}

/// The terminal attempt of a call.
#[derive(Debug)]
pub struct Outcome {
    /// The last attempt made.
    pub attempt: Attempt,
    /// Its classification.
    pub classification: Classification,
    /// Number of attempts made, the last one included.
    pub attempts: u32,
}

/// Runs the retry loop of a single call.
pub struct RetryExecutor<'a> {
    transport: &'a dyn Transport,
    classifier: &'a ResponseClassifier,
    backoff: Backoff,
    sleeper: &'a dyn Sleeper,
}

impl<'a> RetryExecutor<'a> {
    /// Creates an executor over borrowed engine parts.
    pub fn new(
        transport: &'a dyn Transport,
        classifier: &'a ResponseClassifier,
        backoff: Backoff,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            transport,
            classifier,
            backoff,
            sleeper,
        }
    }

    /// Sends `request` until a terminal outcome is reached.
    pub fn run(&self, request: &mut PreparedRequest, max_retries: u32) -> Outcome {
        let mut retry = 0;

        loop {
            if retry > 0 {
                let delay = self.backoff.delay(retry);
                info!(
                    "Starting retry {} for {} {} in {:?}",
                    retry,
                    request.method(),
                    request.url(),
                    delay
                );
                self.sleeper.sleep(delay);
            }

            let attempt = self.send_once(request);
            let classification = self
                .classifier
                .classify(attempt.status(), attempt.error());
            debug!(
                retry,
                status = ?attempt.status(),
                error = ?attempt.error(),
                ?classification,
                "attempt finished"
            );

            if classification == Classification::Retryable && retry < max_retries {
                retry += 1;
                continue;
            }

            if classification == Classification::Retryable {
                warn!(
                    "Retry budget of {} exhausted for {} {}",
                    max_retries,
                    request.method(),
                    request.url()
                );
            }

            return Outcome {
                attempt,
                classification,
                attempts: retry + 1,
            };
        }
    }

    fn send_once(&self, request: &mut PreparedRequest) -> Attempt {
        let mut response = match self.transport.execute(request.next_attempt()) {
            Ok(response) => response,
            Err(error) => return Attempt::Failed(error),
        };

        let mut buffer = Vec::new();
        let error = response
            .body
            .read_to_end(&mut buffer)
            .err()
            .map(|e| TransportError::new(TransportErrorKind::Body, e));

        Attempt::Received {
            response: ResponseInfo {
                status: response.status,
                headers: response.headers,
                body: Bytes::from(buffer),
            },
            error,
        }
    }
}
