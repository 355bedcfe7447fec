//! Access control types
//!
//! Core types used by the path-level permission engine.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Repository name, e.g. `github.com/acme/app`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(String);

impl RepoName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for RepoName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Content inside a repository that a permission check is about
///
/// Only paths are supported today.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoContent {
    pub repo: RepoName,
    /// Repo-relative path
    pub path: String,
}

impl RepoContent {
    pub fn new(repo: impl Into<RepoName>, path: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
        }
    }
}

/// Level of access granted on a piece of repo content
///
/// Ordered so that `None < Read`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Perms {
    #[default]
    None,
    Read,
}

impl Perms {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Perms::None => "none",
            Perms::Read => "read",
        }
    }

    pub const fn can_read(&self) -> bool {
        matches!(self, Perms::Read)
    }
}

impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Path rules synced for one user in one repository
///
/// Patterns are globs rooted at the repository name, evaluated in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub path_includes: Vec<String>,
    #[serde(default)]
    pub path_excludes: Vec<String>,
}

impl RuleSet {
    pub fn new<I, E, S, T>(includes: I, excludes: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            path_includes: includes.into_iter().map(Into::into).collect(),
            path_excludes: excludes.into_iter().map(Into::into).collect(),
        }
    }
}

/// The identity a check is performed for
///
/// A `uid` of zero means there is no real user behind the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
    pub uid: i32,
    pub internal: bool,
}

impl Actor {
    pub const fn anonymous() -> Self {
        Self {
            uid: 0,
            internal: false,
        }
    }

    /// A trusted internal caller, not tied to a user
    pub const fn internal() -> Self {
        Self {
            uid: 0,
            internal: true,
        }
    }

    pub const fn from_user(uid: i32) -> Self {
        Self {
            uid,
            internal: false,
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.internal || self.uid != 0
    }

    pub const fn is_internal(&self) -> bool {
        self.internal
    }
}
