//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from the decoded [`LogSettings`]
//! - Map configured severities onto tracing filter directives
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured severity when set
//! - Blank settings mean `info` on stderr

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogSettings;

/// Error raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log severity {0:?}")]
    UnknownSeverity(String),

    #[error("unsupported log output {0:?}")]
    UnknownOutput(String),

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Stdout,
}

impl LogTarget {
    pub fn parse(output: &str) -> Result<Self, LoggingError> {
        match output.trim().to_ascii_lowercase().as_str() {
            "" | "console" | "stderr" => Ok(LogTarget::Stderr),
            "stdout" => Ok(LogTarget::Stdout),
            _ => Err(LoggingError::UnknownOutput(output.to_string())),
        }
    }
}

/// Filter directive for a configured severity.
pub fn filter_directive(severity: &str) -> Result<&'static str, LoggingError> {
    match severity.trim().to_ascii_lowercase().as_str() {
        "" | "info" => Ok("info"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "warn" | "warning" => Ok("warn"),
        "error" | "fatal" | "panic" => Ok("error"),
        _ => Err(LoggingError::UnknownSeverity(severity.to_string())),
    }
}

/// Install the global subscriber.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let target = LogTarget::parse(&settings.output)?;
    let directive = filter_directive(&settings.severity)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let registry = tracing_subscriber::registry().with(filter);
    match target {
        LogTarget::Stderr => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()?,
        LogTarget::Stdout => registry.with(fmt::layer().with_writer(std::io::stdout)).try_init()?,
    }

    tracing::debug!(?target, directive, "Logging initialized");
    Ok(())
}
