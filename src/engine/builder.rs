//! Builder pattern implementation for creating Engine instances.
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::ContentMode;
//! use courier::http::HttpClientConfig;
//! use courier::EngineBuilder;
//! use reqwest::StatusCode;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), courier::Error> {
//! let engine = EngineBuilder::new()
//!     .content_mode(ContentMode::Json)
//!     .max_retries(3)
//!     .retry_predicate(|status: StatusCode| status == StatusCode::TOO_MANY_REQUESTS)
//!     .http_client_config(HttpClientConfig {
//!         timeout: Some(Duration::from_secs(5)),
//!         ..HttpClientConfig::default()
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::config::EngineConfig;
use super::engine::Engine;
use crate::codec::ContentMode;
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig, Transport};
use crate::retry::{Backoff, ResponseClassifier, RetryPredicate, Sleeper, ThreadSleeper};

use std::fmt;
use std::sync::Arc;

/// A builder used to create an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    http_client: HttpClientConfig,
    transport: Option<Arc<dyn Transport>>,
    predicate: Option<Arc<dyn RetryPredicate>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("http_client", &self.http_client)
            .field("transport", &self.transport.is_some())
            .field("predicate", &self.predicate.is_some())
            .field("sleeper", &self.sleeper.is_some())
            .finish()
    }
}

impl EngineBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        EngineBuilder::default()
    }

    /// Replaces the whole engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the negotiated content mode.
    pub fn content_mode(mut self, content_mode: ContentMode) -> Self {
        self.config.content_mode = content_mode;
        self
    }

    /// Sets the default number of retries per call.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Sets the backoff schedule.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.config.retry.backoff = backoff;
        self
    }

    /// Turns diagnostic traces on or off.
    pub fn diagnostics(mut self, diagnostics: bool) -> Self {
        self.config.diagnostics = diagnostics;
        self
    }

    /// Retries statuses flagged by `predicate` in addition to 500 and 503.
    pub fn retry_predicate(mut self, predicate: impl RetryPredicate + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets how the engine waits between attempts.
    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a transport shared with other owners.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configures the default reqwest client, used when no transport is set.
    pub fn http_client_config(mut self, http_client: HttpClientConfig) -> Self {
        self.http_client = http_client;
        self
    }

    /// Create the [`Engine`] with the specified options.
    ///
    /// When no transport was set, a blocking reqwest client is created from
    /// the [`HttpClientConfig`]. Without a sleeper the engine blocks with
    /// [`ThreadSleeper`].
    ///
    /// # Returns
    ///
    /// The configured [`Engine`], or a [`Build`](crate::ErrorKind::Build)
    /// error when the default HTTP client cannot be created.
    ///
    /// # Example
    ///
    /// ```rust
    /// use courier::retry::Backoff;
    /// use courier::EngineBuilder;
    /// use std::time::Duration;
    ///
    /// let engine = EngineBuilder::new()
    ///     .backoff(Backoff::new(Duration::from_millis(200), Duration::from_millis(50)))
    ///     .diagnostics(true)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(engine.max_retries(), 5);
    /// ```
    pub fn build(self) -> Result<Engine> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let client = create_http_client(self.http_client).map_err(|e| {
                    Error::build(format!("failed to create http client: {}", e)).with_source(e)
                })?;
                Arc::new(client)
            }
        };

        let classifier = match self.predicate {
            Some(predicate) => ResponseClassifier::with_predicate(predicate),
            None => ResponseClassifier::new(),
        };

        let sleeper: Arc<dyn Sleeper> = match self.sleeper {
            Some(sleeper) => sleeper,
            None => Arc::new(ThreadSleeper),
        };

        Ok(Engine::from_parts(self.config, transport, classifier, sleeper))
    }
}
