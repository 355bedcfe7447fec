//! Sub-repo permissions feature flag
//!
//! Checking whether enforcement is on happens on every permission check, so the
//! configured value is cached in an atomic and refreshed by a background task
//! whenever the configuration changes.

use crate::config::AppConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared, lock-free handle to the enforcement switch
///
/// Clones share the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlag {
    enabled: Arc<AtomicBool>,
}

impl FeatureFlag {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Whether path-level enforcement is active
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            info!(enabled, "Sub-repo permissions setting changed");
        }
    }

    /// Follow configuration changes until the sender goes away
    ///
    /// The current value is applied before returning. Once the channel closes
    /// the last observed value stays in place.
    pub fn watch(&self, mut rx: watch::Receiver<AppConfig>) -> JoinHandle<()> {
        self.set(rx.borrow_and_update().sub_repo_permissions_enabled());

        let flag = self.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let enabled = rx.borrow_and_update().sub_repo_permissions_enabled();
                flag.set(enabled);
            }
            debug!("Configuration channel closed, sub-repo permissions setting frozen");
        })
    }
}
