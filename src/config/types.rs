//! Configuration types for subrepo-authz
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Opt-in features
    pub experimental_features: ExperimentalFeatures,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Whether path-level permissions are enforced
    pub fn sub_repo_permissions_enabled(&self) -> bool {
        self.experimental_features.enable_sub_repo_permissions
    }
}

/// Experimental feature switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExperimentalFeatures {
    /// Enforce per-path rules on top of repository access
    pub enable_sub_repo_permissions: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
