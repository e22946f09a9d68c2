//! Core engine implementation.
//!
//! The [`Engine`] composes the pieces of a call: build the request, run the
//! retry loop, classify the terminal attempt and decode it into either the
//! caller's response model or error model.
//!
//! # Examples
//!
//! ```rust,no_run
//! use courier::{EngineBuilder, RequestSpec};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Repo {
//!     full_name: String,
//! }
//!
//! # fn example() -> Result<(), courier::Error> {
//! let engine = EngineBuilder::new().build()?;
//!
//! let mut repo: Option<Repo> = None;
//! engine.call(
//!     RequestSpec::get("https://api.github.com/repos/rust-lang/rust").response_model(&mut repo),
//! )?;
//!
//! if let Some(repo) = repo {
//!     println!("{}", repo.full_name);
//! }
//! # Ok(())
//! # }
//! ```

use super::config::EngineConfig;
use crate::codec::ContentMode;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::request::{RequestBuilder, RequestSpec};
use crate::response::{Response, ResponseDecoder};
use crate::retry::{Attempt, Classification, ResponseClassifier, RetryExecutor, Sleeper};

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Executes logical calls against remote endpoints.
///
/// An engine is long-lived and shared: every call runs on the caller's
/// thread, and the request counter is the only state mutated across calls.
pub struct Engine {
    config: EngineConfig,
    transport: Arc<dyn Transport>,
    classifier: ResponseClassifier,
    sleeper: Arc<dyn Sleeper>,
    request_count: AtomicU64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("classifier", &self.classifier)
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine over the given transport, with the built-in retry
    /// rule and a blocking sleeper.
    pub fn new(config: EngineConfig, transport: impl Transport + 'static) -> Self {
        Self::from_parts(
            config,
            Arc::new(transport),
            ResponseClassifier::new(),
            Arc::new(crate::retry::ThreadSleeper),
        )
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        transport: Arc<dyn Transport>,
        classifier: ResponseClassifier,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            transport,
            classifier,
            sleeper,
            request_count: AtomicU64::new(0),
        }
    }

    /// Gets the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Gets the negotiated content mode.
    pub fn content_mode(&self) -> ContentMode {
        self.config.content_mode
    }

    /// Gets the default retry budget.
    pub fn max_retries(&self) -> u32 {
        self.config.retry.max_retries
    }

    /// Gets whether diagnostic traces are emitted.
    pub fn diagnostics(&self) -> bool {
        self.config.diagnostics
    }

    /// Number of logical calls sent since creation or the last reset.
    ///
    /// Retries are not counted, neither are calls that failed to build.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Resets the request counter to zero.
    pub fn reset_request_count(&self) {
        self.request_count.store(0, Ordering::Relaxed);
    }

    /// Executes one logical call.
    ///
    /// The request is built once, then sent up to `1 + max_retries` times
    /// while the outcome is retryable (status 500 or 503, a handshake
    /// timeout, or a status flagged by the retry predicate). The counter is
    /// bumped once per built call, never per attempt.
    ///
    /// # Arguments
    ///
    /// * `spec` - Method, URL, parameters, body and model slots of the call
    ///
    /// # Returns
    ///
    /// The buffered [`Response`] of a 2xx, with the response model slot of
    /// `spec` filled if one was given. Otherwise an [`Error`] of kind:
    ///
    /// - [`Build`](crate::ErrorKind::Build) when the URL or body is invalid; nothing is sent
    /// - [`Transport`](crate::ErrorKind::Transport) when no usable response was obtained
    /// - [`Status`](crate::ErrorKind::Status) for any other status; the error model slot
    ///   is filled from the body, or the body text is kept under `response_message`
    /// - [`Decode`](crate::ErrorKind::Decode) when a 2xx body does not fit the response model
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use courier::{EngineBuilder, RequestSpec};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Problem {
    ///     detail: String,
    /// }
    ///
    /// # fn example() -> Result<(), courier::Error> {
    /// let engine = EngineBuilder::new().build()?;
    /// let mut problem: Option<Problem> = None;
    ///
    /// let result = engine.call(
    ///     RequestSpec::delete("https://api.example.com/users/7").error_model(&mut problem),
    /// );
    /// if result.is_err() {
    ///     println!("{}", problem.map(|p| p.detail).unwrap_or_default());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn call<B: Serialize>(&self, mut spec: RequestSpec<'_, B>) -> Result<Response> {
        let diagnostics = self.config.diagnostics;
        if diagnostics {
            debug!(url = %spec.full_url(), method = %spec.method(), "building request");
        }

        let mut request = RequestBuilder::new(self.config.content_mode).build(&spec)?;
        self.request_count.fetch_add(1, Ordering::Relaxed);

        if diagnostics {
            debug!(headers = ?request.headers(), "request headers");
            if let Some(body) = request.body().bytes() {
                debug!(
                    length = body.len(),
                    body = %String::from_utf8_lossy(body),
                    "request body"
                );
            }
        }

        let max_retries = spec.max_retries.unwrap_or(self.config.retry.max_retries);
        let executor = RetryExecutor::new(
            self.transport.as_ref(),
            &self.classifier,
            self.config.retry.backoff,
            self.sleeper.as_ref(),
        );
        let outcome = executor.run(&mut request, max_retries);

        let request_info = request.info();
        let (response, read_error) = match outcome.attempt {
            Attempt::Failed(error) => {
                return Err(Error::transport(error)
                    .with_request(request_info)
                    .with_attempts(outcome.attempts))
            }
            Attempt::Received { response, error } => (response, error),
        };

        if diagnostics {
            debug!(
                status = response.status.as_u16(),
                headers = ?response.headers,
                body = %response.text(),
                "response"
            );
        }

        if let Some(error) = read_error {
            let mut error = Error::transport(error)
                .with_request(request_info)
                .with_attempts(outcome.attempts);
            error.set_response(response);
            return Err(error);
        }

        let decoder = ResponseDecoder::new(self.config.content_mode);

        if outcome.classification != Classification::Success {
            let mut error = Error::status(response.status)
                .with_request(request_info)
                .with_attempts(outcome.attempts);
            decoder.decode_failure(spec.error_model.take(), &mut error, &response.body);
            error.set_response(response);
            return Err(error);
        }

        if let Err(e) = decoder.decode_success(spec.response_model.take(), &response.body) {
            let mut error = Error::decode(e)
                .with_request(request_info)
                .with_attempts(outcome.attempts);
            error.set_response(response);
            return Err(error);
        }

        Ok(Response::new(request_info, response, outcome.attempts))
    }
}
