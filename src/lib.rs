//! Courier is a blocking HTTP request execution engine shared by API client
//! libraries.
//!
//! It turns a logical "call a remote endpoint" operation into a wire request
//! and the wire response into a typed result or a typed error, while
//! retrying transient server failures transparently.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use courier::{EngineBuilder, Error, RequestSpec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewIssue<'a> {
//!     title: &'a str,
//! }
//!
//! #[derive(Deserialize)]
//! struct Issue {
//!     number: u64,
//! }
//!
//! #[derive(Deserialize)]
//! struct ApiError {
//!     message: String,
//! }
//!
//! # fn main() -> Result<(), Error> {
//! let engine = EngineBuilder::new().max_retries(3).build()?;
//!
//! let body = NewIssue { title: "Crash on start" };
//! let mut issue: Option<Issue> = None;
//! let mut api_error: Option<ApiError> = None;
//!
//! let result = engine.call(
//!     RequestSpec::post("https://api.example.com/issues")
//!         .body(&body)
//!         .response_model(&mut issue)
//!         .error_model(&mut api_error),
//! );
//!
//! match result {
//!     Ok(_) => println!("created #{}", issue.map_or(0, |issue| issue.number)),
//!     Err(error) => println!(
//!         "{} ({})",
//!         error,
//!         api_error.map(|e| e.message).unwrap_or_default()
//!     ),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`codec`] - content modes and body (de)serialization
//! - [`engine`] - the [`Engine`], its builder and configuration
//! - [`error`] - the [`Error`] carrier and its [`ErrorKind`] taxonomy
//! - [`http`] - the [`Transport`](http::Transport) seam and the default client
//! - [`request`] - [`RequestSpec`], replayable bodies and request building
//! - [`response`] - [`Response`] and response decoding
//! - [`retry`] - retry policy, classification and the send loop

pub mod codec;
pub mod engine;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod retry;

pub use codec::{ContentMode, ModelSlot};
pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use error::{Error, ErrorKind, Result};
pub use http::{create_http_client, HttpClientConfig, Transport, TransportErrorKind};
pub use request::{Body, NoBody, RequestSpec};
pub use response::{RequestInfo, Response, ResponseInfo};
pub use retry::{Backoff, RetryPolicy, RetryPredicate, Sleeper};
