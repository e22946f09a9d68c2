//! Content codecs.
//!
//! An engine negotiates one [`ContentMode`] at construction time and uses it
//! both to encode request body models and to decode response bodies into
//! caller models. Form encoding is a per-request override handled by
//! [`form`].
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::{decode, encode, ContentMode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Item {
//!     id: u32,
//!     name: String,
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let item = Item { id: 7, name: "seven".into() };
//! let bytes = encode(ContentMode::Xml, &item)?;
//! let back: Item = decode(ContentMode::Xml, &bytes)?;
//! assert_eq!(item, back);
//! # Ok(())
//! # }
//! ```

pub mod form;

pub use form::encode_form;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Media type of JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";
/// Media type of XML bodies.
pub const APPLICATION_XML: &str = "application/xml";
/// Media type of form-urlencoded bodies.
pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// The serialization format an engine applies to bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// JSON bodies, with `Accept`/`Content-Type` defaults.
    #[default]
    Json,
    /// XML bodies. No default headers are set.
    Xml,
    /// Raw exchange. Models still go through JSON, but no default headers
    /// are set.
    Raw,
}

impl ContentMode {
    /// The media type advertised by default for this mode, if any.
    pub fn default_media_type(self) -> Option<&'static str> {
        match self {
            Self::Json => Some(APPLICATION_JSON),
            Self::Xml | Self::Raw => None,
        }
    }
}

/// Encoding or decoding failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// XML (de)serialization failed.
    #[error("xml: {0}")]
    Xml(String),
    /// The model cannot be flattened into form pairs.
    #[error("form: {0}")]
    Form(String),
}

/// Encodes a model with the codec of the given mode.
pub fn encode<T: Serialize>(mode: ContentMode, value: &T) -> Result<Bytes, CodecError> {
    match mode {
        ContentMode::Xml => quick_xml::se::to_string(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Xml(e.to_string())),
        ContentMode::Json | ContentMode::Raw => Ok(Bytes::from(serde_json::to_vec(value)?)),
    }
}

/// Decodes bytes into a model with the codec of the given mode.
pub fn decode<T: DeserializeOwned>(mode: ContentMode, bytes: &[u8]) -> Result<T, CodecError> {
    match mode {
        ContentMode::Xml => {
            quick_xml::de::from_reader(bytes).map_err(|e| CodecError::Xml(e.to_string()))
        }
        ContentMode::Json | ContentMode::Raw => Ok(serde_json::from_slice(bytes)?),
    }
}

/// A caller-owned sink the engine fills with a decoded model.
///
/// Implemented for `Option<T>`: on success the option is set to `Some`.
///
/// ```rust
/// use courier::codec::{ContentMode, ModelSlot};
///
/// let mut slot: Option<Vec<u32>> = None;
/// slot.fill(ContentMode::Json, b"[1,2,3]").unwrap();
/// assert_eq!(slot, Some(vec![1, 2, 3]));
/// ```
pub trait ModelSlot {
    /// Decodes `bytes` and stores the result.
    fn fill(&mut self, mode: ContentMode, bytes: &[u8]) -> Result<(), CodecError>;
}

impl<T: DeserializeOwned> ModelSlot for Option<T> {
    fn fill(&mut self, mode: ContentMode, bytes: &[u8]) -> Result<(), CodecError> {
        *self = Some(decode(mode, bytes)?);
        Ok(())
    }
}
