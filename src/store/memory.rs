//! In-memory rule store
//!
//! Holds synced rules in process memory. Writes are visible to the very next
//! read, so it never serves stale rules. Used by tests and by the CLI, which
//! seeds it from a TOML rules file.

use crate::access_control::types::{RepoName, RuleSet};
use crate::error::{ConfigError, StoreResult};
use crate::store::RuleSetStore;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct StoreData {
    rules: HashMap<i32, HashMap<RepoName, RuleSet>>,
    supported: HashSet<RepoName>,
}

/// Rule store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryRuleSetStore {
    data: RwLock<StoreData>,
}

impl InMemoryRuleSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoned locks are recovered: the data is plain maps and stays consistent
    // between individual writes.

    fn write_data(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.data.write().unwrap_or_else(|poisoned| {
            warn!("rule store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_data(&self) -> RwLockReadGuard<'_, StoreData> {
        self.data.read().unwrap_or_else(|poisoned| {
            warn!("rule store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Replace the rules for one user in one repository
    pub fn set_rules(&self, user_id: i32, repo: impl Into<RepoName>, rules: RuleSet) {
        let repo = repo.into();
        debug!(user_id, repo = %repo, "Storing rule set");
        self.write_data()
            .rules
            .entry(user_id)
            .or_default()
            .insert(repo, rules);
    }

    /// Drop every rule set synced for a user
    pub fn remove_user(&self, user_id: i32) {
        self.write_data().rules.remove(&user_id);
    }

    /// Mark whether a repository enforces path-level rules
    pub fn set_repo_supported(&self, repo: impl Into<RepoName>, supported: bool) {
        let repo = repo.into();
        let mut data = self.write_data();
        if supported {
            data.supported.insert(repo);
        } else {
            data.supported.remove(&repo);
        }
    }

    /// Build a store from a parsed rules document
    pub fn from_rules(file: RulesFile) -> Result<Self, ConfigError> {
        let store = Self::new();
        let mut seen = HashSet::new();

        for repo in file.supported_repos {
            store.set_repo_supported(repo, true);
        }

        for entry in file.rules {
            let repo = RepoName::from(entry.repo);
            if !seen.insert((entry.user_id, repo.clone())) {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "duplicate rules for user {} in repo '{}'",
                        entry.user_id, repo
                    ),
                });
            }
            store.set_rules(
                entry.user_id,
                repo,
                RuleSet {
                    path_includes: entry.path_includes,
                    path_excludes: entry.path_excludes,
                },
            );
        }

        Ok(store)
    }

    /// Parse a TOML rules document (useful for testing)
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: RulesFile =
            toml::from_str(toml_str).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::from_rules(file)
    }

    /// Load a TOML rules file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "Rules file not found: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[async_trait]
impl RuleSetStore for InMemoryRuleSetStore {
    async fn get_by_user(&self, user_id: i32) -> StoreResult<HashMap<RepoName, RuleSet>> {
        Ok(self
            .read_data()
            .rules
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn repo_supported(&self, repo: &RepoName) -> StoreResult<bool> {
        Ok(self.read_data().supported.contains(repo))
    }
}

/// On-disk rules document
///
/// ```toml
/// supported_repos = ["github.com/acme/app"]
///
/// [[rules]]
/// user_id = 42
/// repo = "github.com/acme/app"
/// path_includes = ["github.com/acme/app/**"]
/// path_excludes = ["github.com/acme/app/secret/**"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesFile {
    pub supported_repos: Vec<String>,
    pub rules: Vec<RuleEntry>,
}

/// One (user, repo) rule set in a rules document
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub user_id: i32,
    pub repo: String,
    #[serde(default)]
    pub path_includes: Vec<String>,
    #[serde(default)]
    pub path_excludes: Vec<String>,
}
