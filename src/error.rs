//! Error handling for the courier engine.
//!
//! Every failed call surfaces as a single [`Error`] value. The error carries
//! the taxonomy ([`ErrorKind`]), a free-text message, the last request and
//! response that were seen, extra key/value context and the number of send
//! attempts that were made. Callers never have to correlate a failure with a
//! side channel: everything needed for diagnosis travels with the error.
//!
//! # Examples
//!
//! ```rust
//! use courier::{Error, ErrorKind};
//! use reqwest::StatusCode;
//!
//! let mut error = Error::status(StatusCode::NOT_FOUND);
//! error.set_extra("response_message", "no such user");
//!
//! assert_eq!(error.kind(), ErrorKind::Status(StatusCode::NOT_FOUND));
//! assert_eq!(error.to_string(), "Server returned statuscode 404");
//! assert_eq!(error.extra("response_message"), Some("no such user"));
//! ```

use crate::http::{TransportError, TransportErrorKind};
use crate::response::{RequestInfo, ResponseInfo};

use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Boxed error used for wrapped sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Extra key holding the raw error body when the error model did not decode.
pub const RESPONSE_MESSAGE: &str = "response_message";

/// The category of a failed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built: body encoding or URL construction
    /// failed. Nothing was sent.
    Build,
    /// No usable response was obtained from the transport.
    Transport(TransportErrorKind),
    /// A response was obtained but its status is outside the 2xx range.
    Status(StatusCode),
    /// The response body did not decode into the caller's model.
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Transport(kind) => write!(f, "transport ({kind})"),
            Self::Status(status) => write!(f, "status {}", status.as_u16()),
            Self::Decode => f.write_str("decode"),
        }
    }
}

/// Errors that can happen when executing a call.
///
/// `Error` is a structured carrier: the engine populates it through the
/// `set_*` methods and never inspects it afterwards.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    request: Option<RequestInfo>,
    response: Option<ResponseInfo>,
    extra: BTreeMap<String, String>,
    attempts: u32,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error of the given kind with a message and no context.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request: None,
            response: None,
            extra: BTreeMap::new(),
            attempts: 0,
            source: None,
        }
    }

    /// Creates a [`ErrorKind::Build`] error.
    pub fn build(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Build, message)
    }

    /// Creates a [`ErrorKind::Status`] error with the synthesized message
    /// `Server returned statuscode {status}`.
    pub fn status(status: StatusCode) -> Self {
        Self::new(
            ErrorKind::Status(status),
            format!("Server returned statuscode {}", status.as_u16()),
        )
    }

    /// Creates a [`ErrorKind::Decode`] error wrapping the codec failure.
    pub fn decode<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(ErrorKind::Decode, source.to_string()).with_source(source)
    }

    /// Creates a [`ErrorKind::Transport`] error from a transport failure.
    pub fn transport(source: TransportError) -> Self {
        Self::new(ErrorKind::Transport(source.kind()), source.to_string()).with_source(source)
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = Some(request);
        self
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Stores the request the error relates to.
    pub fn set_request(&mut self, request: RequestInfo) {
        self.request = Some(request);
    }

    /// Stores the response the error relates to.
    pub fn set_response(&mut self, response: ResponseInfo) {
        self.response = Some(response);
    }

    /// Replaces the error message.
    pub fn set_message(&mut self, message: impl fmt::Display) {
        self.message = message.to_string();
    }

    /// Adds a key/value pair of extra context, replacing any previous value.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Gets the error category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the last request sent (or built), if any.
    pub fn request(&self) -> Option<&RequestInfo> {
        self.request.as_ref()
    }

    /// Gets the last response received, if any.
    pub fn response(&self) -> Option<&ResponseInfo> {
        self.response.as_ref()
    }

    /// Gets a single extra context value.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Gets all extra context values.
    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Gets the number of send attempts made before the error was returned.
    ///
    /// Zero for build errors.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Gets the HTTP status of the last response, if one was obtained.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self.kind {
            ErrorKind::Status(status) => Some(status),
            _ => self.response.as_ref().map(|response| response.status),
        }
    }

    /// Returns true for [`ErrorKind::Build`] errors.
    pub fn is_build(&self) -> bool {
        matches!(self.kind, ErrorKind::Build)
    }

    /// Returns true for [`ErrorKind::Transport`] errors.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_))
    }

    /// Returns true for [`ErrorKind::Status`] errors.
    pub fn is_status(&self) -> bool {
        matches!(self.kind, ErrorKind::Status(_))
    }

    /// Returns true for [`ErrorKind::Decode`] errors.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ErrorKind::Decode)
    }
}

/// Result type alias for operations that can fail with a courier error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_status_message() {
        let error = Error::status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.to_string(), "Server returned statuscode 503");
        assert_eq!(error.status_code(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(error.is_status());
    }

    #[test]
    fn test_set_message_and_extra() {
        let mut error = Error::build("first");
        error.set_message(format_args!("second {}", 2));
        error.set_extra("a", "1");
        error.set_extra("a", "2");

        assert_eq!(error.message(), "second 2");
        assert_eq!(error.extra("a"), Some("2"));
        assert_eq!(error.extras().len(), 1);
        assert_eq!(error.attempts(), 0);
    }

    #[test]
    fn test_transport_keeps_source() {
        let cause = TransportError::new(
            TransportErrorKind::Connect,
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        let error = Error::transport(cause);

        assert_eq!(
            error.kind(),
            ErrorKind::Transport(TransportErrorKind::Connect)
        );
        assert!(error.source().is_some());
        assert!(error.to_string().contains("refused"));
    }
}
