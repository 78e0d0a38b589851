//! Dual-source configuration model for a multi-role cluster node.

pub mod config;
pub mod observability;
pub mod topology;

pub use config::{
    parse_from_document, parse_from_environment, parse_from_toml, parse_from_yaml, Config,
    ConfigError, SharedConfig,
};
