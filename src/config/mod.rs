//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! YAML/TOML document                  PREFIX_* variables
//!     → document.rs (Node tree)           → env.rs (name per field)
//!            \                                /
//!             → schema.rs field table (visit.rs)
//!             → types.rs leaf decoders
//!             → Config (validated, immutable)
//!             → shared.rs (Arc snapshot handed to subsystems)
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs decodes a brand-new Config
//!     → atomic swap in SharedConfig
//!     → readers pick it up on their next snapshot
//! ```
//!
//! # Design Decisions
//! - Exactly one source per Config; document and variables are never merged
//! - Both sources are walked by the same schema, so they cannot drift apart
//! - All-or-nothing: the first decode error aborts, no partial Config
//! - Config is immutable once built; changes require a full reload

pub mod document;
pub mod env;
pub mod error;
pub mod loader;
pub mod schema;
pub mod shared;
pub mod types;
pub mod visit;
pub mod watcher;

use std::collections::BTreeMap;

pub use document::DocumentFormat;
pub use env::{ProcessEnv, VarFn, VarSource, DEFAULT_PREFIX};
pub use error::{ConfigError, ErrorKind};
pub use schema::{AccessRole, AuthorityRole, BackendDescriptor, Config, LogSettings, TunnelRole};
pub use shared::SharedConfig;
pub use types::{KeyValueSet, NetworkEndpoint, NetworkEndpointList};

/// Decode a configuration document.
pub fn parse_from_document(bytes: &[u8], format: DocumentFormat) -> Result<Config, ConfigError> {
    document::decode(bytes, format)
}

/// Decode a YAML configuration document.
pub fn parse_from_yaml(text: &str) -> Result<Config, ConfigError> {
    document::decode(text.as_bytes(), DocumentFormat::Yaml)
}

/// Decode a TOML configuration document.
pub fn parse_from_toml(text: &str) -> Result<Config, ConfigError> {
    document::decode(text.as_bytes(), DocumentFormat::Toml)
}

/// Decode a configuration from variables named `PREFIX_SECTION_FIELD`.
pub fn parse_from_environment<S: VarSource + ?Sized>(
    prefix: &str,
    source: &S,
) -> Result<Config, ConfigError> {
    env::decode(prefix, source)
}

/// Render a configuration as a document that decodes back to it.
pub fn render_document(config: &Config, format: DocumentFormat) -> Result<String, ConfigError> {
    document::render(config, format)
}

/// Render a configuration as the variable set that decodes back to it.
pub fn render_environment(
    prefix: &str,
    config: &Config,
) -> Result<BTreeMap<String, String>, ConfigError> {
    env::encode(prefix, config)
}
