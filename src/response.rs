//! Call results and response decoding.
//!
//! A successful call yields a [`Response`] holding the buffered body. The
//! [`ResponseDecoder`] fills the caller's model slots from that buffer; the
//! body is read from the network once and may be decoded several times.
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::ContentMode;
//! use courier::response::ResponseDecoder;
//!
//! let decoder = ResponseDecoder::new(ContentMode::Json);
//! let mut ids: Option<Vec<u32>> = None;
//! decoder.decode_success(Some(&mut ids), b"[1, 2]").unwrap();
//! assert_eq!(ids, Some(vec![1, 2]));
//! ```

use crate::codec::{CodecError, ContentMode, ModelSlot};
use crate::error::{Error, RESPONSE_MESSAGE};

use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode, Url};

/// Snapshot of the request that was sent.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// HTTP method.
    pub method: Method,
    /// Full URL, query included.
    pub url: Url,
    /// Final request headers.
    pub headers: HeaderMap,
}

/// Snapshot of a received response.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Buffered response body.
    pub body: Bytes,
}

impl ResponseInfo {
    /// The body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The result of a successful call.
#[derive(Debug, Clone)]
pub struct Response {
    request: RequestInfo,
    response: ResponseInfo,
    attempts: u32,
}

impl Response {
    pub(crate) fn new(request: RequestInfo, response: ResponseInfo, attempts: u32) -> Self {
        Self {
            request,
            response,
            attempts,
        }
    }

    /// Gets the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Gets the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    /// Gets the buffered response body.
    pub fn body(&self) -> &Bytes {
        &self.response.body
    }

    /// Gets the body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        self.response.text()
    }

    /// Gets the request that produced this response.
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// Gets the response snapshot.
    pub fn info(&self) -> &ResponseInfo {
        &self.response
    }

    /// Gets the number of send attempts made.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Decodes buffered bodies into caller-provided model slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder {
    content_mode: ContentMode,
}

impl ResponseDecoder {
    /// Creates a decoder for the given content mode.
    pub fn new(content_mode: ContentMode) -> Self {
        Self { content_mode }
    }

    /// Fills the response model, if one was requested.
    pub fn decode_success(
        &self,
        slot: Option<&mut dyn ModelSlot>,
        body: &[u8],
    ) -> Result<(), CodecError> {
        match slot {
            Some(slot) => slot.fill(self.content_mode, body),
            None => Ok(()),
        }
    }

    /// Fills the error model, if one was requested.
    ///
    /// A body that does not decode is kept as text under the
    /// `response_message` extra of `error`; the error itself is unchanged.
    pub fn decode_failure(&self, slot: Option<&mut dyn ModelSlot>, error: &mut Error, body: &[u8]) {
        if let Some(slot) = slot {
            if slot.fill(self.content_mode, body).is_err() {
                error.set_extra(RESPONSE_MESSAGE, String::from_utf8_lossy(body));
            }
        }
    }
}
