//! HTTP module containing the transport seam and the default client.
//!
//! The engine never talks to a concrete HTTP library directly. It hands a
//! [`TransportRequest`] to something implementing [`Transport`] and gets back
//! either a [`TransportResponse`] or a typed [`TransportError`].
//!
//! # Overview
//!
//! - [`client`] - creation of the default blocking reqwest client
//! - [`transport`] - the `Transport` trait and its request/response types
//!
//! # Examples
//!
//! ```rust
//! use courier::http::{create_http_client, HttpClientConfig};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig {
//!     timeout: Some(Duration::from_secs(10)),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig};
pub use transport::{
    Transport, TransportError, TransportErrorKind, TransportRequest, TransportResponse,
};
