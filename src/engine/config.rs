//! Configuration structures and defaults for the engine.
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::ContentMode;
//! use courier::engine::EngineConfig;
//!
//! let config = EngineConfig {
//!     content_mode: ContentMode::Xml,
//!     diagnostics: true,
//!     ..EngineConfig::default()
//! };
//! assert_eq!(config.retry.max_retries, 5);
//! ```

use crate::codec::ContentMode;
use crate::retry::RetryPolicy;

/// Construction-time configuration of an [`Engine`](super::Engine).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Serialization format of request and response bodies.
    pub content_mode: ContentMode,
    /// Retry budget and backoff.
    pub retry: RetryPolicy,
    /// Emit debug traces of URLs, headers and bodies.
    pub diagnostics: bool,
}
