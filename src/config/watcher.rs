//! Configuration change notification
//!
//! Holds the current configuration in a `tokio::sync::watch` channel so that
//! background tasks (such as the feature flag watcher) see every change.

use crate::config::loader::load_config;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use tokio::sync::watch;
use tracing::{info, warn};

/// Publisher of configuration updates
#[derive(Debug)]
pub struct ConfigWatcher {
    tx: watch::Sender<AppConfig>,
    source: Option<String>,
}

impl ConfigWatcher {
    /// Create a watcher seeded with a configuration that has no backing source
    pub fn new(initial: AppConfig) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, source: None }
    }

    /// Load configuration and remember where it came from for later reloads
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let initial = load_config(config_path)?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            tx,
            source: config_path.map(str::to_string),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<AppConfig> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> AppConfig {
        self.tx.borrow().clone()
    }

    /// Replace the current configuration and notify subscribers
    pub fn publish(&self, config: AppConfig) {
        self.tx.send_replace(config);
    }

    /// Re-read the configuration source and publish it
    ///
    /// On failure the previous configuration stays current.
    pub fn reload(&self) -> Result<(), ConfigError> {
        match load_config(self.source.as_deref()) {
            Ok(config) => {
                info!(source = ?self.source, "Configuration reloaded");
                self.publish(config);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, source = ?self.source, "Configuration reload failed, keeping previous");
                Err(e)
            }
        }
    }
}
