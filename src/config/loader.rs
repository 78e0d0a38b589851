//! Configuration loading from disk or the process environment.

use std::fs;
use std::path::Path;

use crate::config::document::{self, DocumentFormat};
use crate::config::env::{self, ProcessEnv};
use crate::config::error::ConfigError;
use crate::config::schema::Config;

/// Load a configuration file, choosing YAML or TOML by extension.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;
    let content = fs::read(path)?;
    let config = document::decode(&content, format)?;

    tracing::info!(path = %path.display(), ?format, "Configuration loaded");
    Ok(config)
}

/// Load a configuration from process environment variables under `prefix`.
pub fn load_from_env(prefix: &str) -> Result<Config, ConfigError> {
    let config = env::decode(prefix, &ProcessEnv)?;

    tracing::info!(prefix, "Configuration loaded from environment");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_file(".yaml", "fqdn: node.example.com\nssh:\n  enabled: true\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fqdn, "node.example.com");
        assert!(config.ssh.enabled);
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_file(".toml", "fqdn = \"node.example.com\"\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fqdn, "node.example.com");
    }

    #[test]
    fn test_unknown_extension() {
        let file = write_file(".ini", "fqdn=node\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownFormat);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_syntax_error() {
        let file = write_file(".yaml", "auth: [unclosed\n");
        let err = load_config(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_var("LOADERTEST_DATA_DIR", Some("/tmp/data_dir"), || {
            let config = load_from_env("LOADERTEST").unwrap();
            assert_eq!(config.data_dir, "/tmp/data_dir");
        });
    }
}
