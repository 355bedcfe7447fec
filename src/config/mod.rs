//! Configuration module
//!
//! Handles loading and validating configuration from TOML files and environment
//! variables, and publishing changes to running tasks.

pub mod loader;
pub mod types;
pub mod watcher;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
pub use watcher::ConfigWatcher;
