//! Error types for subrepo-authz
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API;
//! the binary wraps them in `anyhow` at the top level.

use std::fmt;
use thiserror::Error;

/// Errors returned by permission checks
///
/// A check that finds no applicable grant is not an error: it returns
/// `Perms::None`. These variants are reserved for conditions the caller
/// must see.
#[derive(Error, Debug)]
pub enum AuthzError {
    /// The actor has no real identity while enforcement is active
    #[error("unauthenticated")]
    Unauthenticated,

    /// A required collaborator is missing (deployment defect)
    #[error("misconfiguration: {message}")]
    Misconfiguration { message: String },

    /// The rule store failed
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// A stored rule could not be compiled
    #[error("building {kind} matcher for pattern '{pattern}': {reason}")]
    RuleCompile {
        kind: RuleKind,
        pattern: String,
        reason: String,
    },
}

impl AuthzError {
    pub fn misconfiguration(message: impl Into<String>) -> Self {
        Self::Misconfiguration {
            message: message.into(),
        }
    }

    pub fn upstream(context: &'static str, source: StoreError) -> Self {
        Self::Upstream { context, source }
    }

    /// Whether this error means "no identity" rather than a fault
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthzError::Unauthenticated)
    }
}

/// Which side of a rule set a pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Include,
    Exclude,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Include => write!(f, "include"),
            RuleKind::Exclude => write!(f, "exclude"),
        }
    }
}

/// Errors surfaced by a `RuleSetStore` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("rule store unavailable: {0}")]
    Unavailable(String),

    #[error("rule store backend error: {0}")]
    Backend(String),
}

/// Configuration and rules-file loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for permission checks
pub type AuthzResult<T> = std::result::Result<T, AuthzError>;

/// Result type alias for rule store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
