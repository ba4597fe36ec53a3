//! Typed configuration system for Heron.
//!
//! This crate provides a strongly-typed configuration system for Heron
//! servers with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - `.properties` files feeding the server context's system properties
//!
//! # Example
//!
//! ```no_run
//! use heron_config::ConfigLoader;
//!
//! # fn main() -> Result<(), heron_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("heron.toml")?
//!     .with_env_prefix("HERON")
//!     .load()?;
//!
//! println!("Server will listen on: {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//!
//! [session]
//! cookie_name = "heronSession"
//! lifetime_secs = 900
//! sweep_interval_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [properties]
//! files = ["conf/"]
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`, e.g. `HERON__SERVER__HTTP_ADDR=0.0.0.0:9000`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod properties;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use properties::{load_properties, parse_properties, PROPERTIES_EXTENSION};
pub use schema::*;
