//! Access control module
//!
//! Provides path-level read permissions inside repositories, enforced on top of
//! repository-level access.
//!
//! ## Decision Order
//!
//! A check on behalf of an actor runs through the following steps, stopping at
//! the first one that decides:
//!
//! 1. **Enforcement disabled** - read is granted
//! 2. **Anonymous actor** - unauthenticated error
//! 3. **Internal actor** - read is granted
//! 4. **Repo without path rules** - read is granted
//! 5. **No rules synced for the repo** - no access
//! 6. **Exclude patterns** - a match denies
//! 7. **Include patterns** - a match grants read
//! 8. **Nothing matched** - no access
//!
//! ## Rule Format
//!
//! Rules are globs rooted at the repository name, with `/` as separator:
//!
//! ```text
//! includes: ["github.com/acme/app/**"]
//! excludes: ["github.com/acme/app/secrets/**", "github.com/acme/app/*.pem"]
//! ```

pub mod gate;
pub mod patterns;
pub mod resolver;
pub mod types;

pub use gate::{actor_permissions, filter_actor_paths};
pub use patterns::{GlobList, MatchOutcome, PathMatcher};
pub use resolver::{PermissionChecker, SubRepoPermsClient};
pub use types::{Actor, Perms, RepoContent, RepoName, RuleSet};
