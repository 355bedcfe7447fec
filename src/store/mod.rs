//! Rule set store
//!
//! The permission engine does not own rule data. It reads it through the
//! [`RuleSetStore`] trait, implemented by whatever persists synced rules.

pub mod memory;

pub use memory::{InMemoryRuleSetStore, RulesFile};

use crate::access_control::types::{RepoName, RuleSet};
use crate::error::StoreResult;
// async_trait required for dyn-compatibility with Arc<dyn RuleSetStore>
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of per-user path rules
///
/// Both methods may perform I/O. Dropping the returned future must abandon
/// the underlying request.
#[async_trait]
pub trait RuleSetStore: Send + Sync {
    /// All rule sets synced for a user, keyed by repository
    async fn get_by_user(&self, user_id: i32) -> StoreResult<HashMap<RepoName, RuleSet>>;

    /// Whether path-level rules are enforced for the repository at all
    async fn repo_supported(&self, repo: &RepoName) -> StoreResult<bool>;
}

/// Shared handle to a rule store
pub type SharedRuleSetStore = Arc<dyn RuleSetStore>;
