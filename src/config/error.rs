//! Configuration error types.
//!
//! # Design Decisions
//! - Decoder errors carry no location; the pipeline that hit them wraps them
//!   in [`ConfigError::Field`] with the dotted field path
//! - Both pipelines wrap with the same path, so a malformed value reports the
//!   same error whichever source supplied it
//! - [`ConfigError::kind`] looks through the wrapping

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while reading or decoding a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An endpoint string is not of the form `scheme://address`.
    #[error("malformed endpoint {value:?}: expected scheme://address")]
    MalformedEndpoint { value: String },

    /// A key-value token is not of the form `key:value`.
    #[error("malformed key:value token {token:?}")]
    MalformedKeyValue { token: String },

    /// A document node has the wrong shape for the field it feeds.
    #[error("schema mismatch at `{path}`: expected {expected}")]
    SchemaMismatch { path: String, expected: &'static str },

    /// A scalar could not be coerced into the field's type.
    #[error("cannot coerce {value:?} into {expected}")]
    TypeCoercion { value: String, expected: &'static str },

    /// A decoder error at a specific field.
    #[error("invalid value at `{path}`: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML render error: {0}")]
    TomlRender(#[from] toml::ser::Error),

    /// The file extension does not name a supported document format.
    #[error("unsupported configuration format: {}", .0.display())]
    UnknownFormat(PathBuf),
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedEndpoint,
    MalformedKeyValue,
    SchemaMismatch,
    TypeCoercion,
    Io,
    Syntax,
    UnknownFormat,
}

impl ConfigError {
    /// Attach a field path to a decoder error.
    pub(crate) fn at(self, path: impl Into<String>) -> Self {
        ConfigError::Field {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Classify the error, looking through field wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MalformedEndpoint { .. } => ErrorKind::MalformedEndpoint,
            ConfigError::MalformedKeyValue { .. } => ErrorKind::MalformedKeyValue,
            ConfigError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            ConfigError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            ConfigError::Field { source, .. } => source.kind(),
            ConfigError::Io(_) => ErrorKind::Io,
            ConfigError::Utf8(_)
            | ConfigError::Yaml(_)
            | ConfigError::Toml(_)
            | ConfigError::TomlRender(_) => ErrorKind::Syntax,
            ConfigError::UnknownFormat(_) => ErrorKind::UnknownFormat,
        }
    }

    /// Dotted path of the offending field, if the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::Field { path, .. } | ConfigError::SchemaMismatch { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_field() {
        let err = ConfigError::MalformedEndpoint {
            value: "localhost:5000".into(),
        }
        .at("auth.http_addr");

        assert_eq!(err.kind(), ErrorKind::MalformedEndpoint);
        assert_eq!(err.path(), Some("auth.http_addr"));
        assert_eq!(
            err.to_string(),
            "invalid value at `auth.http_addr`: malformed endpoint \"localhost:5000\": expected scheme://address"
        );
    }

    #[test]
    fn test_unknown_format_message() {
        let err = ConfigError::UnknownFormat(PathBuf::from("/etc/node.ini"));
        assert_eq!(err.kind(), ErrorKind::UnknownFormat);
        assert_eq!(err.to_string(), "unsupported configuration format: /etc/node.ini");
        assert!(err.path().is_none());
    }
}
