//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::Config;
use crate::config::shared::SharedConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<Config>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for freshly decoded configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Config>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            update_tx,
        }, update_rx)
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| handle_event(&path, &tx, res),
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload on modify/create events. A file that fails to decode is reported
/// and skipped, leaving the published configuration in place.
fn handle_event(path: &Path, tx: &mpsc::UnboundedSender<Config>, res: notify::Result<Event>) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Watch error: {:?}", e);
            return;
        }
    };
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return;
    }

    tracing::info!(path = %path.display(), "Config file change detected, reloading...");
    match load_config(path) {
        Ok(new_config) => {
            let _ = tx.send(new_config);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
        }
    }
}

/// Publish every received configuration until the sender side closes.
///
/// Identical reloads are skipped.
pub async fn apply_updates(shared: SharedConfig, mut updates: mpsc::UnboundedReceiver<Config>) {
    while let Some(config) = updates.recv().await {
        if *shared.snapshot() == config {
            tracing::debug!("Reloaded configuration unchanged");
            continue;
        }
        shared.replace(config);
    }
    tracing::info!("Config update channel closed");
}
