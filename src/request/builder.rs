//! Turning a [`RequestSpec`] into a sendable request.
//!
//! The [`RequestBuilder`] resolves the URL and query, encodes the body once
//! into a [`ReplayableBody`] and computes the final header set:
//!
//! 1. defaults of the negotiated content mode (`Accept`, `Content-Type`);
//! 2. the caller's overlay, each named header deleted then replaced.
//!
//! Nothing is sent when building fails.

use super::body::ReplayableBody;
use super::spec::{Body, RequestSpec};
use crate::codec::{self, ContentMode, APPLICATION_FORM};
use crate::error::{Error, Result};
use crate::http::TransportRequest;
use crate::response::RequestInfo;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, Url,
};
use serde::Serialize;

/// A built request: final URL and headers plus its replayable body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: ReplayableBody,
}

impl PreparedRequest {
    /// Creates a prepared request from its parts.
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: ReplayableBody) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Gets the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the full URL, query included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Gets the final headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets the replayable body.
    pub fn body(&self) -> &ReplayableBody {
        &self.body
    }

    /// Snapshot used in responses and errors.
    pub fn info(&self) -> RequestInfo {
        RequestInfo {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
        }
    }

    /// Re-arms the body and produces the transport request of the next
    /// attempt.
    pub fn next_attempt(&mut self) -> TransportRequest {
        TransportRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.rearm(),
        }
    }
}

/// Builds [`PreparedRequest`]s for one negotiated content mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder {
    content_mode: ContentMode,
}

impl RequestBuilder {
    /// Creates a builder for the given content mode.
    pub fn new(content_mode: ContentMode) -> Self {
        Self { content_mode }
    }

    /// Gets the content mode.
    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }

    /// Builds the request described by `spec`.
    ///
    /// # Arguments
    ///
    /// * `spec` - The call to prepare; its model slots are left untouched
    ///
    /// # Returns
    ///
    /// A [`PreparedRequest`] whose body can be re-armed for every attempt,
    /// or a [`Build`](crate::ErrorKind::Build) error when the URL is
    /// malformed or the body model cannot be encoded.
    pub fn build<B: Serialize>(&self, spec: &RequestSpec<'_, B>) -> Result<PreparedRequest> {
        let url = Url::parse(&spec.url).map_err(|e| {
            Error::build(format!("invalid request url {}: {}", spec.url, e)).with_source(e)
        })?;
        let url = spec.append_parameters(url);

        let headers = self.headers(spec);
        let info = RequestInfo {
            method: spec.method.clone(),
            url: url.clone(),
            headers: headers.clone(),
        };

        let body = self.encode_body(spec).map_err(|e| {
            Error::build(format!("failed to encode request body: {}", e))
                .with_source(e)
                .with_request(info)
        })?;

        Ok(PreparedRequest::new(
            spec.method.clone(),
            url,
            headers,
            ReplayableBody::new(body),
        ))
    }

    fn encode_body<B: Serialize>(
        &self,
        spec: &RequestSpec<'_, B>,
    ) -> std::result::Result<Option<Bytes>, codec::CodecError> {
        match &spec.body {
            Body::Raw(bytes) => Ok(Some(bytes.clone())),
            Body::Empty => Ok(None),
            Body::Model(model) if spec.is_form_encoded() => codec::encode_form(*model).map(Some),
            Body::Model(model) => codec::encode(self.content_mode, *model).map(Some),
        }
    }

    fn headers<B>(&self, spec: &RequestSpec<'_, B>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(media_type) = self.content_mode.default_media_type() {
            headers.insert(ACCEPT, HeaderValue::from_static(media_type));
            if spec.body.is_model() && !spec.is_form_encoded() {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(media_type));
            }
        }

        if spec.body.is_model() && spec.is_form_encoded() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_FORM));
        }

        for (name, values) in &spec.headers {
            headers.remove(name);
            for value in values {
                headers.append(name.clone(), value.clone());
            }
        }

        headers
    }
}
