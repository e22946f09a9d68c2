//! The transport seam.
//!
//! A [`Transport`] executes one prepared request and returns the status,
//! headers and a single-use body reader. It is shared by every call going
//! through an engine, so implementations must be safe for concurrent use.
//!
//! Failures are classified into a [`TransportErrorKind`] when they are
//! created. The retry loop looks at the kind only, never at error messages.
//!
//! # Examples
//!
//! A canned transport, handy for tests:
//!
//! ```rust
//! use courier::http::{Transport, TransportError, TransportRequest, TransportResponse};
//! use reqwest::{header::HeaderMap, StatusCode};
//!
//! struct AlwaysOk;
//!
//! impl Transport for AlwaysOk {
//!     fn execute(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
//!         Ok(TransportResponse::from_bytes(StatusCode::OK, HeaderMap::new(), "{}"))
//!     }
//! }
//! ```

use crate::error::BoxError;
use crate::request::BodyStream;

use bytes::Bytes;
use reqwest::{
    blocking::{Body, Client},
    header::HeaderMap,
    Method, StatusCode, Url,
};
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;
use thiserror::Error;

/// A request ready to be sent by a [`Transport`].
///
/// The body is a fresh stream over the replayable bytes of the call; it is
/// rebuilt for every attempt.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Full URL, query included.
    pub url: Url,
    /// Final request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<BodyStream>,
}

/// A response returned by a [`Transport`].
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Single-use response body stream.
    pub body: Box<dyn Read + Send>,
}

impl TransportResponse {
    /// Creates a response around a body reader.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// Creates a response with an in-memory body.
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self::new(status, headers, Cursor::new(body.into()))
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Category of a transport failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Connection establishment or TLS handshake timed out.
    ConnectTimeout,
    /// Connection could not be established.
    Connect,
    /// The request timed out after the connection was up.
    Timeout,
    /// Sending the request body or reading the response body failed.
    Body,
    /// Anything else.
    Other,
}

impl TransportErrorKind {
    /// Whether a failure of this kind is worth another attempt.
    ///
    /// Only handshake/connection timeouts qualify.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ConnectTimeout)
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ConnectTimeout => "connect timeout",
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Body => "body",
            Self::Other => "other",
        };
        f.write_str(text)
    }
}

/// A failure reported by a [`Transport`].
#[derive(Debug, Error)]
#[error("{kind} error: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: BoxError,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Gets the failure category.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_connect() && error.is_timeout() {
            TransportErrorKind::ConnectTimeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, error)
    }
}

/// Something able to execute a prepared HTTP request.
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response head plus its body stream.
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).execute(request)
    }
}

impl Transport for Client {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(stream) = request.body {
            let len = stream.len();
            builder = builder.body(Body::sized(stream, len));
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();

        Ok(TransportResponse::new(status, headers, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_only_connect_timeout_is_retryable() {
        assert!(TransportErrorKind::ConnectTimeout.is_retryable());
        assert!(!TransportErrorKind::Connect.is_retryable());
        assert!(!TransportErrorKind::Timeout.is_retryable());
        assert!(!TransportErrorKind::Body.is_retryable());
        assert!(!TransportErrorKind::Other.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let error = TransportError::new(
            TransportErrorKind::ConnectTimeout,
            io::Error::new(io::ErrorKind::TimedOut, "handshake"),
        );
        assert_eq!(error.to_string(), "connect timeout error: handshake");
        assert_eq!(error.kind(), TransportErrorKind::ConnectTimeout);
    }

    #[test]
    fn test_response_from_bytes() {
        let mut response = TransportResponse::from_bytes(StatusCode::OK, HeaderMap::new(), "hi");
        let mut body = String::new();
        response.body.read_to_string(&mut body).unwrap();
        assert_eq!(body, "hi");
        assert!(format!("{:?}", response).contains("TransportResponse"));
    }
}
