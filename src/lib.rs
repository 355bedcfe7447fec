//! Sub-repository permissions
//!
//! Decides whether an actor may read a path inside a repository, on top of
//! repository-level access that has already been granted elsewhere.
//!
//! ## Features
//!
//! - **Per-user, per-repo rules** with glob include/exclude patterns
//! - **Exclude wins** so secrets can be carved out of an included tree
//! - **Fail closed** when no rule matches or no rules have been synced
//! - **Runtime switch** driven by configuration changes, read lock-free
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use subrepo_authz::{
//!     access_control::{Actor, PermissionChecker, RepoContent, RuleSet, SubRepoPermsClient},
//!     feature_flag::FeatureFlag,
//!     store::InMemoryRuleSetStore,
//! };
//!
//! # async fn run() -> Result<(), subrepo_authz::AuthzError> {
//! let store = InMemoryRuleSetStore::new();
//! store.set_repo_supported("acme/app", true);
//! store.set_rules(42, "acme/app", RuleSet::new(["acme/app/**"], ["acme/app/secret/**"]));
//!
//! let client = SubRepoPermsClient::new(FeatureFlag::new(true), Arc::new(store));
//! let perms = client
//!     .actor_permissions(&Actor::from_user(42), &RepoContent::new("acme/app", "src/main.rs"))
//!     .await?;
//! assert!(perms.can_read());
//! # Ok(())
//! # }
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod feature_flag;
pub mod store;

// Re-export main types
pub use access_control::{Actor, PermissionChecker, Perms, RepoContent, SubRepoPermsClient};
pub use config::{AppConfig, load_config};
pub use error::{AuthzError, AuthzResult, ConfigError, StoreError};
pub use feature_flag::FeatureFlag;
pub use store::{InMemoryRuleSetStore, RuleSetStore};
