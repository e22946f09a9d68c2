//! Default HTTP client setup.
//!
//! Builds the blocking reqwest client used when an engine is created without
//! an explicit transport. Connection pooling, TLS, redirects and compression
//! are all left to reqwest.
//!
//! Deadlines are configured here and nowhere else: the retry loop has no
//! cancellation primitive, so a per-call `timeout` on the client is the only
//! way to bound a single attempt.
//!
//! # Examples
//!
//! ```rust
//! use courier::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
//!
//! let config = HttpClientConfig {
//!     headers: Some(headers),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::Proxy;
use std::time::Duration;

/// Default user agent sent by clients created with [`create_http_client`].
pub const DEFAULT_USER_AGENT: &str = concat!("courier/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Total timeout of a single attempt. `None` disables it.
    pub timeout: Option<Duration>,
    /// Timeout for establishing a connection, TLS handshake included.
    pub connect_timeout: Option<Duration>,
    /// Optional proxy configuration. Setting one disables system proxy
    /// detection.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// User agent header value.
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            proxy: None,
            headers: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        }
    }
}

/// Creates a blocking HTTP client from the configuration.
///
/// # Example
///
/// ```rust
/// use courier::http::client::{create_http_client, HttpClientConfig};
///
/// let client = create_http_client(HttpClientConfig::default()).unwrap();
/// ```
pub fn create_http_client(config: HttpClientConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().timeout(config.timeout);

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy) = config.proxy {
        builder = builder.proxy(proxy);
    }

    if let Some(headers) = config.headers {
        builder = builder.default_headers(headers);
    }

    if let Some(user_agent) = config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build()
}
