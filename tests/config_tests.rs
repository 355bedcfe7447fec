//! Configuration and rules-file loading tests

use std::env;
use std::fs;
use subrepo_authz::config::{ConfigWatcher, LogFormat, load_config, load_config_from_str};
use subrepo_authz::error::ConfigError;
use subrepo_authz::store::{InMemoryRuleSetStore, RuleSetStore};
use tempfile::tempdir;

const FULL_CONFIG: &str = r#"
[experimental_features]
enable_sub_repo_permissions = true

[logging]
level = "warn"
format = "json"
"#;

const RULES: &str = r#"
supported_repos = ["github.com/acme/app", "github.com/acme/infra"]

[[rules]]
user_id = 42
repo = "github.com/acme/app"
path_includes = ["github.com/acme/app/**"]
path_excludes = ["github.com/acme/app/secret/**"]

[[rules]]
user_id = 42
repo = "github.com/acme/infra"
path_includes = ["github.com/acme/infra/docs/**"]
"#;

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();
    assert!(config.sub_repo_permissions_enabled());
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_invalid_format_rejected() {
    let result = load_config_from_str(
        r#"
[logging]
format = "xml"
"#,
    );
    assert!(result.is_err());
}

#[test]
#[serial_test::serial]
fn test_load_config_from_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("subrepo-authz.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert!(config.sub_repo_permissions_enabled());
}

#[test]
#[serial_test::serial]
fn test_env_var_overrides_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("subrepo-authz.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    unsafe {
        env::set_var(
            "SUBREPO_AUTHZ_EXPERIMENTAL_FEATURES__ENABLE_SUB_REPO_PERMISSIONS",
            "false",
        );
    }

    let config = load_config(Some(config_path.to_str().unwrap()));

    unsafe {
        env::remove_var("SUBREPO_AUTHZ_EXPERIMENTAL_FEATURES__ENABLE_SUB_REPO_PERMISSIONS");
    }

    assert!(!config.unwrap().sub_repo_permissions_enabled());
}

#[test]
#[serial_test::serial]
fn test_reload_picks_up_file_changes() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("subrepo-authz.toml");
    fs::write(&config_path, "").unwrap();

    let watcher = ConfigWatcher::load(Some(config_path.to_str().unwrap())).unwrap();
    let rx = watcher.subscribe();
    assert!(!rx.borrow().sub_repo_permissions_enabled());

    fs::write(&config_path, FULL_CONFIG).unwrap();
    watcher.reload().unwrap();
    assert!(rx.borrow().sub_repo_permissions_enabled());

    fs::write(&config_path, "[logging]\nlevel = \"shouty\"\n").unwrap();
    assert!(watcher.reload().is_err());
    assert!(watcher.current().sub_repo_permissions_enabled());
}

#[tokio::test]
async fn test_rules_file_loads_into_store() {
    let dir = tempdir().unwrap();
    let rules_path = dir.path().join("rules.toml");
    fs::write(&rules_path, RULES).unwrap();

    let store = InMemoryRuleSetStore::from_file(&rules_path).unwrap();
    let rules = store.get_by_user(42).await.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(
        rules.get("github.com/acme/infra").unwrap().path_includes,
        vec!["github.com/acme/infra/docs/**"]
    );
    assert!(
        store
            .repo_supported(&"github.com/acme/infra".into())
            .await
            .unwrap()
    );
}

#[test]
fn test_missing_rules_file() {
    let result = InMemoryRuleSetStore::from_file("/nonexistent/rules.toml");
    assert!(matches!(result.unwrap_err(), ConfigError::Load(_)));
}

#[test]
fn test_malformed_rules_file() {
    let result = InMemoryRuleSetStore::from_toml_str("[[rules]]\nuser_id = \"forty-two\"\n");
    assert!(matches!(result.unwrap_err(), ConfigError::Load(_)));
}
