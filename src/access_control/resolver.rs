//! Sub-repo permissions resolver
//!
//! Decides whether a user may read a path inside a repository. The check runs
//! in a fixed order, and everything up to the rule fetch short-circuits
//! without touching the store:
//! 1. Enforcement disabled: read
//! 2. No user: unauthenticated
//! 3. No store configured: misconfiguration
//! 4. Repo does not enforce path rules: read
//! 5. No rules synced for the repo: none
//! 6. Exclude rules, then include rules, in stored order
//! 7. Nothing matched: none

use crate::access_control::gate;
use crate::access_control::patterns::{MatchOutcome, PathMatcher, join_path};
use crate::access_control::types::{Actor, Perms, RepoContent};
use crate::error::{AuthzError, AuthzResult};
use crate::feature_flag::FeatureFlag;
use crate::store::SharedRuleSetStore;
use async_trait::async_trait;
use tracing::{debug, error, trace};

/// Path-level permission checks
///
/// Implemented by [`SubRepoPermsClient`]; callers hold it as a trait object so
/// tests can substitute their own.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Whether path-level enforcement is active
    fn enabled(&self) -> bool;

    /// Level of access a user has on the content
    ///
    /// A `user_id` of zero yields [`AuthzError::Unauthenticated`] while
    /// enforcement is active.
    async fn permissions(&self, user_id: i32, content: &RepoContent) -> AuthzResult<Perms>;

    /// Level of access an actor has on the content
    async fn actor_permissions(&self, actor: &Actor, content: &RepoContent) -> AuthzResult<Perms> {
        gate::actor_permissions(self, actor, content).await
    }
}

/// Permission checker backed by a rule store
///
/// Path enforcement sits on top of repository permissions: the caller must
/// already have established that the user can see the repository. Create
/// one at startup and share it.
pub struct SubRepoPermsClient {
    flag: FeatureFlag,
    store: Option<SharedRuleSetStore>,
}

impl SubRepoPermsClient {
    pub fn new(flag: FeatureFlag, store: SharedRuleSetStore) -> Self {
        Self {
            flag,
            store: Some(store),
        }
    }

    /// Build a client whose store may be missing
    ///
    /// Checks against a client without a store fail while enforcement is on.
    pub fn with_optional_store(flag: FeatureFlag, store: Option<SharedRuleSetStore>) -> Self {
        Self { flag, store }
    }

    pub fn flag(&self) -> &FeatureFlag {
        &self.flag
    }
}

#[async_trait]
impl PermissionChecker for SubRepoPermsClient {
    fn enabled(&self) -> bool {
        self.flag.enabled()
    }

    async fn permissions(&self, user_id: i32, content: &RepoContent) -> AuthzResult<Perms> {
        if !self.flag.enabled() {
            return Ok(Perms::Read);
        }

        if user_id == 0 {
            return Err(AuthzError::Unauthenticated);
        }

        let Some(store) = &self.store else {
            error!(user_id, repo = %content.repo, "Sub-repo permissions checked without a rule store");
            return Err(AuthzError::misconfiguration("rule store is not configured"));
        };

        let supported = store.repo_supported(&content.repo).await.map_err(|e| {
            AuthzError::upstream("checking for sub-repo permissions support", e)
        })?;
        if !supported {
            // Repository level access has already been granted
            trace!(repo = %content.repo, "Repo does not enforce path rules");
            return Ok(Perms::Read);
        }

        let rules_by_repo = store
            .get_by_user(user_id)
            .await
            .map_err(|e| AuthzError::upstream("getting permissions", e))?;

        let Some(rules) = rules_by_repo.get(&content.repo) else {
            // Supported repos carry at least an allow-all rule once synced
            debug!(user_id, repo = %content.repo, "No rules synced for repo, denying");
            return Ok(Perms::None);
        };

        let matcher = PathMatcher::new(&rules.path_includes, &rules.path_excludes)?;

        // Rules are rooted at the repo name; the bare path only feeds excludes
        let qualified = join_path(&[content.repo.as_str(), content.path.as_str()]);
        let relative = join_path(&[content.path.as_str()]);

        let outcome = matcher.evaluate(&qualified, &relative);
        match outcome {
            MatchOutcome::Excluded(rule) => {
                debug!(user_id, repo = %content.repo, path = %content.path, rule, "Path excluded");
            }
            MatchOutcome::Included(rule) => {
                trace!(user_id, repo = %content.repo, path = %content.path, rule, "Path included");
            }
            MatchOutcome::NoMatch => {
                debug!(user_id, repo = %content.repo, path = %content.path, "No rule matched, denying");
            }
        }
        Ok(outcome.perms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::types::RuleSet;
    use crate::store::InMemoryRuleSetStore;
    use std::sync::Arc;

    fn client(store: InMemoryRuleSetStore) -> SubRepoPermsClient {
        SubRepoPermsClient::new(FeatureFlag::new(true), Arc::new(store))
    }

    #[tokio::test]
    async fn test_rules_rooted_at_repo_name() {
        let store = InMemoryRuleSetStore::new();
        store.set_repo_supported("github.com/acme/app", true);
        store.set_rules(
            5,
            "github.com/acme/app",
            RuleSet::new(["github.com/acme/app/**"], ["github.com/acme/app/*.key"]),
        );
        let client = client(store);

        let readme = RepoContent::new("github.com/acme/app", "README.md");
        assert_eq!(client.permissions(5, &readme).await.unwrap(), Perms::Read);

        let key = RepoContent::new("github.com/acme/app", "server.key");
        assert_eq!(client.permissions(5, &key).await.unwrap(), Perms::None);

        // `*` does not cross directories
        let nested = RepoContent::new("github.com/acme/app", "certs/server.key");
        assert_eq!(client.permissions(5, &nested).await.unwrap(), Perms::Read);
    }

    #[tokio::test]
    async fn test_path_is_cleaned_before_matching() {
        let store = InMemoryRuleSetStore::new();
        store.set_repo_supported("r", true);
        store.set_rules(5, "r", RuleSet::new(["r/**"], ["r/secret/**"]));
        let client = client(store);

        let sneaky = RepoContent::new("r", "public/../secret/key.pem");
        assert_eq!(client.permissions(5, &sneaky).await.unwrap(), Perms::None);

        let slashes = RepoContent::new("r", "/public//file.txt");
        assert_eq!(client.permissions(5, &slashes).await.unwrap(), Perms::Read);
    }

    #[tokio::test]
    async fn test_first_invalid_rule_aborts() {
        let store = InMemoryRuleSetStore::new();
        store.set_repo_supported("r", true);
        store.set_rules(5, "r", RuleSet::new(["r/{a,b"], Vec::<String>::new()));
        let client = client(store);

        let err = client
            .permissions(5, &RepoContent::new("r", "a/file"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::RuleCompile { .. }));
    }

    #[tokio::test]
    async fn test_missing_store_is_misconfiguration() {
        let client = SubRepoPermsClient::with_optional_store(FeatureFlag::new(true), None);
        let err = client
            .permissions(5, &RepoContent::new("r", "file"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Misconfiguration { .. }));
    }

    #[tokio::test]
    async fn test_missing_store_ignored_when_disabled() {
        let client = SubRepoPermsClient::with_optional_store(FeatureFlag::new(false), None);
        let perms = client
            .permissions(5, &RepoContent::new("r", "file"))
            .await
            .unwrap();
        assert_eq!(perms, Perms::Read);
    }
}
