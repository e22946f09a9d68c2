//! The description of one logical call.
//!
//! A [`RequestSpec`] is built by endpoint code for every call and consumed
//! by [`Engine::call`](crate::Engine::call). Its body is an explicit tagged
//! value ([`Body`]): nothing, a model to encode, or raw pre-encoded bytes.
//!
//! # Examples
//!
//! ```rust
//! use courier::RequestSpec;
//! use reqwest::header::{HeaderName, HeaderValue};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewUser<'a> {
//!     name: &'a str,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//! }
//!
//! let new_user = NewUser { name: "ada" };
//! let mut created: Option<User> = None;
//!
//! let spec = RequestSpec::post("https://api.example.com/users")
//!     .parameter("notify", "false")
//!     .header(HeaderName::from_static("x-api-key"), HeaderValue::from_static("secret"))
//!     .body(&new_user)
//!     .response_model(&mut created)
//!     .max_retries(2);
//!
//! assert_eq!(spec.full_url(), "https://api.example.com/users?notify=false");
//! ```

use super::body::ReplayableBody;
use crate::codec::ModelSlot;

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};

/// Placeholder body type of a spec without a body model.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoBody;

/// The body of a request.
#[derive(Debug)]
pub enum Body<'a, B> {
    /// No body.
    Empty,
    /// A model encoded by the engine's codec (or form encoding).
    Model(&'a B),
    /// Pre-encoded bytes sent verbatim.
    Raw(Bytes),
}

impl<B> Body<'_, B> {
    /// Returns true when the request has no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true when the body is a model.
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Returns true when the body is raw bytes.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Input to one logical call.
pub struct RequestSpec<'a, B = NoBody> {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) parameters: BTreeMap<String, String>,
    pub(crate) body: Body<'a, B>,
    pub(crate) response_model: Option<&'a mut dyn ModelSlot>,
    pub(crate) error_model: Option<&'a mut dyn ModelSlot>,
    pub(crate) headers: Vec<(HeaderName, Vec<HeaderValue>)>,
    pub(crate) form_encoded: Option<bool>,
    pub(crate) max_retries: Option<u32>,
}

impl<'a> RequestSpec<'a, NoBody> {
    /// Creates a spec for the given method and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            parameters: BTreeMap::new(),
            body: Body::Empty,
            response_model: None,
            error_model: None,
            headers: Vec::new(),
            form_encoded: None,
            max_retries: None,
        }
    }

    /// Creates a `GET` spec.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a `POST` spec.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a `PUT` spec.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a `PATCH` spec.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Creates a `DELETE` spec.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }
}

impl<'a, B> RequestSpec<'a, B> {
    /// Sets a query parameter. A later value for the same key wins.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(key, value);
        self
    }

    /// Sets several query parameters.
    pub fn parameters<K, V, I>(mut self, parameters: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in parameters {
            self.set_parameter(key, value);
        }
        self
    }

    /// Sets a query parameter in place. A later value for the same key wins.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Sets the body model.
    ///
    /// Raw bytes take precedence: if [`raw_body`](Self::raw_body) was called
    /// before, the raw bytes are kept and the model is ignored.
    pub fn body<T: Serialize>(self, model: &'a T) -> RequestSpec<'a, T> {
        let body = match self.body {
            Body::Raw(bytes) => Body::Raw(bytes),
            Body::Empty | Body::Model(_) => Body::Model(model),
        };

        RequestSpec {
            method: self.method,
            url: self.url,
            parameters: self.parameters,
            body,
            response_model: self.response_model,
            error_model: self.error_model,
            headers: self.headers,
            form_encoded: self.form_encoded,
            max_retries: self.max_retries,
        }
    }

    /// Sets pre-encoded body bytes, sent verbatim. Replaces any body model.
    pub fn raw_body(mut self, bytes: impl Into<Bytes>) -> Self {
        self.body = Body::Raw(bytes.into());
        self
    }

    /// Reads a (possibly single-use) reader to the end and uses its content
    /// as the raw body.
    pub fn raw_body_reader<R: Read>(self, reader: R) -> io::Result<Self> {
        let body = ReplayableBody::from_reader(reader)?;
        Ok(self.raw_body(body.into_bytes().unwrap_or_default()))
    }

    /// Sets the sink filled with the decoded response on success.
    pub fn response_model(mut self, slot: &'a mut dyn ModelSlot) -> Self {
        self.response_model = Some(slot);
        self
    }

    /// Sets the sink filled with the decoded error body on failure.
    pub fn error_model(mut self, slot: &'a mut dyn ModelSlot) -> Self {
        self.error_model = Some(slot);
        self
    }

    /// Adds a header value to the overlay.
    ///
    /// Overlay headers replace every default value of the same name. Calling
    /// this several times with one name sends all the values.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        match self.headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((name, vec![value])),
        }
        self
    }

    /// Sets the overlay values of a header, discarding earlier overlay values.
    ///
    /// An empty set removes the header from the request.
    pub fn replace_header<I>(mut self, name: HeaderName, values: I) -> Self
    where
        I: IntoIterator<Item = HeaderValue>,
    {
        let values: Vec<HeaderValue> = values.into_iter().collect();
        match self.headers.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = values,
            None => self.headers.push((name, values)),
        }
        self
    }

    /// Encodes the body model as `application/x-www-form-urlencoded`.
    pub fn form_encoded(mut self, form_encoded: bool) -> Self {
        self.form_encoded = Some(form_encoded);
        self
    }

    /// Overrides the engine's retry budget for this call.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Gets the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the base URL, without parameters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Gets the query parameters.
    pub fn query_parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Gets the body.
    pub fn body_ref(&self) -> &Body<'a, B> {
        &self.body
    }

    /// Gets the header overlay.
    pub fn header_overlay(&self) -> &[(HeaderName, Vec<HeaderValue>)] {
        &self.headers
    }

    /// Gets the per-call retry override.
    pub fn max_retries_override(&self) -> Option<u32> {
        self.max_retries
    }

    /// Returns true when form encoding was requested.
    pub fn is_form_encoded(&self) -> bool {
        self.form_encoded.unwrap_or(false)
    }

    /// Renders the URL with its encoded query parameters.
    ///
    /// The rendering matches the URL that is sent: parameters are appended
    /// to the query, before any fragment. A URL that does not parse is
    /// rendered as text with the query appended.
    pub fn full_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(url) => self.append_parameters(url).into(),
            Err(_) if self.parameters.is_empty() => self.url.clone(),
            Err(_) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&self.parameters)
                    .finish();
                let separator = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{}{}", self.url, separator, query)
            }
        }
    }

    pub(crate) fn append_parameters(&self, mut url: Url) -> Url {
        if !self.parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.parameters);
        }
        url
    }
}

impl<B> fmt::Debug for RequestSpec<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.body {
            Body::Empty => "empty",
            Body::Model(_) => "model",
            Body::Raw(_) => "raw",
        };

        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("parameters", &self.parameters)
            .field("body", &body)
            .field("response_model", &self.response_model.is_some())
            .field("error_model", &self.error_model.is_some())
            .field("headers", &self.headers)
            .field("form_encoded", &self.form_encoded)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
