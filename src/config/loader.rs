//! Configuration Loader
//!
//! Environment-aware configuration loading: YAML file discovery, environment
//! detection, override merging and `${VAR}` expansion.

use super::error::{ConfigResult, ConfigurationError};
use super::BundlrConfig;
use crate::constants::system::MAX_CONFIG_FILE_SIZE;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const CONFIG_FILE_NAMES: [&str; 2] = ["bundlr-config.yaml", "bundlr-config.yml"];
const ENVIRONMENTS: [&str; 3] = ["development", "test", "production"];

#[derive(Debug)]
pub struct ConfigManager {
    config: BundlrConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Useful for tests that must not touch process environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let mut config = Self::load_and_merge_config(&config_directory, environment)?;
        Self::expand_environment_variables(&mut config)?;
        config.validate()?;

        let sanitized_config = Self::sanitize_config_for_logging(&config);
        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&sanitized_config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        crate::log_config!(info, "Configuration loaded successfully",
            environment: environment,
            database_host: config.database.host.clone(),
            pool_size: config.database.pool,
            templates: config.templates.len()
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: BundlrConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            environment: config.environment.clone(),
            config,
            config_directory: Self::default_config_directory(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &BundlrConfig {
        &self.config
    }

    /// Configuration as JSON with sensitive fields masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment: BUNDLR_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("BUNDLR_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    /// BUNDLR_CONFIG_DIR when set, otherwise `./config`
    fn default_config_directory() -> PathBuf {
        env::var("BUNDLR_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// Find the configuration file
    pub fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.exists() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    /// Read a configuration file, refusing oversized or non-regular files
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        let read_error = |e| ConfigurationError::file_read_error(path.display().to_string(), e);
        let metadata = std::fs::metadata(path).map_err(read_error)?;

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "config_path",
                path.display().to_string(),
                "not a regular file",
            ));
        }
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "config_path",
                path.display().to_string(),
                format!(
                    "{} bytes exceeds the {} byte limit",
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                ),
            ));
        }

        std::fs::read_to_string(path).map_err(read_error)
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<BundlrConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content = Self::read_config_file_safely(&config_file)?;
        Self::parse_with_environment(&yaml_content, &config_file.display().to_string(), environment)
    }

    /// Parse YAML text, apply the `environment` section and drop all
    /// environment sections before deserializing
    pub fn parse_with_environment(
        yaml_content: &str,
        source: &str,
        environment: &str,
    ) -> ConfigResult<BundlrConfig> {
        let mut yaml_data: YamlValue = serde_yaml::from_str(yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(source, e))?;

        // An empty file parses as null
        if yaml_data.is_null() {
            yaml_data = YamlValue::Mapping(Default::default());
        }

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!(
                "Applying environment-specific overrides for: {}",
                environment
            );
            Self::merge_yaml_values(&mut yaml_data, env_overrides);
        }

        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for name in ENVIRONMENTS {
                map.remove(YamlValue::String(name.to_string()));
            }
        }

        let mut config: BundlrConfig = serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                source,
                format!("Failed to deserialize configuration: {e}"),
            )
        })?;

        config.environment = environment.to_string();
        Ok(config)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value);
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
    }

    /// Expand a `${VAR}` database URL from the environment.
    ///
    /// An unset variable clears the URL so the component-based URL is used.
    fn expand_environment_variables(config: &mut BundlrConfig) -> ConfigResult<()> {
        let Some(url) = config.database.url.clone() else {
            return Ok(());
        };
        let Some(var_name) = url.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) else {
            return Ok(());
        };

        if var_name.is_empty() {
            return Err(ConfigurationError::environment_variable_error(
                var_name,
                "database.url names an empty variable",
            ));
        }

        match env::var(var_name) {
            Ok(env_value) => {
                debug!(
                    "Expanding environment variable {} in database URL",
                    var_name
                );
                config.database.url = Some(env_value);
            }
            Err(_) => {
                warn!(
                    "Environment variable {} not found, using component database settings",
                    var_name
                );
                config.database.url = None;
            }
        }
        Ok(())
    }

    fn sanitize_config_for_logging(config: &BundlrConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        mask_secrets(&mut config_json);
        config_json
    }
}

const SECRET_KEY_FRAGMENTS: [&str; 6] = ["password", "secret", "key", "token", "credential", "url"];

/// Replace every non-null value under a secret-looking key with a mask
fn mask_secrets(value: &mut serde_json::Value) {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let key = key.to_lowercase();
                if !SECRET_KEY_FRAGMENTS.iter().any(|fragment| key.contains(fragment)) {
                    mask_secrets(entry);
                } else if !entry.is_null() {
                    let hint = match entry.as_str() {
                        Some("") => "[EMPTY]".to_string(),
                        Some(text) if text.chars().count() > 4 => {
                            let head: String = text.chars().take(2).collect();
                            format!("[MASKED: {head}***]")
                        }
                        _ => "[MASKED]".to_string(),
                    };
                    *entry = Value::String(hint);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}
