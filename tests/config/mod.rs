use std::fs;
use std::path::PathBuf;

use bundlr_core::config::{ConfigManager, ConfigurationError};
use bundlr_core::pipeline::TemplateRegistry;
use bundlr_core::PipelineTemplate;
use tempfile::TempDir;

fn repo_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

#[test]
fn test_shipped_config_loads_for_every_environment() {
    for environment in ["development", "test", "production"] {
        let manager =
            ConfigManager::load_from_directory_with_env(Some(repo_config_dir()), environment)
                .unwrap_or_else(|e| panic!("{environment}: {e}"));
        assert_eq!(manager.environment(), environment);
        assert_eq!(manager.config().environment, environment);
    }
}

#[test]
fn test_shipped_config_test_overrides() {
    let manager =
        ConfigManager::load_from_directory_with_env(Some(repo_config_dir()), "test").unwrap();
    let config = manager.config();

    assert!(config.is_test_environment());
    assert_eq!(config.database.pool, 2);
    assert_eq!(config.database.database_name("test"), "bundlr_test");
    assert_eq!(config.pipeline.blocker_poll_interval_seconds, 1);
}

#[test]
fn test_shipped_templates_match_builtin() {
    let manager =
        ConfigManager::load_from_directory_with_env(Some(repo_config_dir()), "development")
            .unwrap();
    assert_eq!(manager.config().templates, PipelineTemplate::builtin());

    let registry = manager.config().template_registry().unwrap();
    assert_eq!(registry.len(), TemplateRegistry::with_builtin_templates().len());
}

#[test]
fn test_production_pool_accepts_mapping_form() {
    let manager =
        ConfigManager::load_from_directory_with_env(Some(repo_config_dir()), "production")
            .unwrap();
    assert!(manager.config().is_production_environment());
    assert_eq!(manager.config().database.pool, 25);
}

#[test]
fn test_custom_template_from_yaml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bundlr-config.yaml"),
        r#"
database:
  host: "db.internal"
templates:
  - id: "social-sprint"
    name: "Social Sprint"
    deliverables:
      - { id: "post-pack", name: "Post Pack", type: "asset_bundle" }
    stages:
      - { id: "create", name: "Create", order: 0, required_deliverables: ["post-pack"] }
      - { id: "ship", name: "Ship", order: 1 }
"#,
    )
    .unwrap();

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap();
    let registry = manager.config().template_registry().unwrap();
    assert_eq!(registry.ids(), vec!["social-sprint"]);
    assert!(registry.is_last_stage("social-sprint", "ship"));
}

#[test]
fn test_invalid_template_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bundlr-config.yaml"),
        r#"
database:
  host: "localhost"
templates:
  - id: "broken"
    name: "Broken"
    deliverables: []
    stages:
      - { id: "only", name: "Only", order: 0, required_deliverables: ["ghost"] }
"#,
    )
    .unwrap();

    let err = ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidTemplate(_)));
}

#[test]
fn test_missing_directory_lists_searched_paths() {
    let dir = TempDir::new().unwrap();
    let err = ConfigManager::load_from_directory_with_env(
        Some(dir.path().join("does-not-exist")),
        "test",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::ConfigFileNotFound { .. }));
}
