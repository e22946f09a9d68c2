//! Engine module containing the call orchestration, its builder and
//! configuration.
//!
//! # Overview
//!
//! - `engine` - the [`Engine`] and its `call` operation
//! - `builder` - [`EngineBuilder`] for flexible configuration
//! - `config` - [`EngineConfig`] and its defaults
//!
//! # Examples
//!
//! ```rust
//! use courier::codec::ContentMode;
//! use courier::engine::{Engine, EngineConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = courier::http::create_http_client(Default::default())?;
//! let engine = Engine::new(
//!     EngineConfig {
//!         content_mode: ContentMode::Xml,
//!         ..EngineConfig::default()
//!     },
//!     client,
//! );
//! assert_eq!(engine.request_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod engine;

pub use builder::EngineBuilder;
pub use config::EngineConfig;
pub use engine::Engine;
