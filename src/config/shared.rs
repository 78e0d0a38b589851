//! Process-wide published configuration.
//!
//! # Responsibilities
//! - Hold the current [`Config`] behind a lock-free handle
//! - Hand out immutable snapshots to subsystems
//! - Replace the configuration wholesale on reload
//!
//! # Design Decisions
//! - Passed explicitly to each subsystem; there is no global
//! - A snapshot never changes; a reload publishes a new `Arc<Config>`

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::Config;

/// Cloneable handle to the currently published configuration.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<Config>>,
}

impl SharedConfig {
    /// Publish the initial configuration.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// The current configuration. Later reloads do not affect it.
    pub fn snapshot(&self) -> Arc<Config> {
        self.inner.load_full()
    }

    /// Publish a new configuration, returning the one it replaced.
    pub fn replace(&self, config: Config) -> Arc<Config> {
        let previous = self.inner.swap(Arc::new(config));
        tracing::info!("Configuration replaced");
        previous
    }
}
