//! Request construction.
//!
//! - [`spec`] - [`RequestSpec`], the caller-side description of a call
//! - [`body`] - [`ReplayableBody`], the buffer re-sent on every attempt
//! - [`builder`] - [`RequestBuilder`], spec to [`PreparedRequest`]
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::ContentMode;
//! use courier::request::{RequestBuilder, RequestSpec};
//!
//! # fn example() -> Result<(), courier::Error> {
//! let spec = RequestSpec::get("https://api.example.com/health");
//! let prepared = RequestBuilder::new(ContentMode::Json).build(&spec)?;
//! assert_eq!(prepared.url().as_str(), "https://api.example.com/health");
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod builder;
pub mod spec;

pub use body::{BodyStream, ReplayableBody};
pub use builder::{PreparedRequest, RequestBuilder};
pub use spec::{Body, NoBody, RequestSpec};
