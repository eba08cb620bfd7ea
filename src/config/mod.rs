//! # Bundlr Configuration System
//!
//! YAML-based configuration with environment overrides and explicit
//! validation. A single file holds the database connection, pipeline polling
//! settings, event channel sizing and the pipeline templates factories are
//! built from.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bundlr_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let manager = ConfigManager::load()?;
//!
//! let database_url = manager.config().database_url();
//! let registry = manager.config().template_registry()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::constants::system::{
    DEFAULT_BLOCKER_POLL_INTERVAL, DEFAULT_CONNECT_TIMEOUT_SECONDS, DEFAULT_DATABASE_POOL,
    DEFAULT_EVENT_CHANNEL_CAPACITY,
};
use crate::models::PipelineTemplate;
use crate::pipeline::TemplateRegistry;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Pool size given either as a plain integer or as `{ max_connections: N }`
fn deserialize_pool_config<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Number(n) => match n.as_u64() {
            Some(i) => i.try_into().map_err(|_| {
                D::Error::custom("Pool size exceeds maximum allowed value (u32::MAX)")
            }),
            None => Err(D::Error::custom("Pool value must be a positive integer")),
        },
        Value::Object(obj) => match obj.get("max_connections").and_then(Value::as_u64) {
            Some(max_conn) => max_conn.try_into().map_err(|_| {
                D::Error::custom("max_connections exceeds maximum allowed value (u32::MAX)")
            }),
            None => Err(D::Error::custom(
                "Structured pool format requires a numeric max_connections field",
            )),
        },
        _ => Err(D::Error::custom(
            "Pool must be either an integer or an object with max_connections",
        )),
    }
}

/// Root configuration structure mirroring bundlr-config.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BundlrConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub events: EventsConfig,

    /// Pipeline templates; the built-in set when the key is absent
    #[serde(default = "PipelineTemplate::builtin")]
    pub templates: Vec<PipelineTemplate>,

    /// Environment the configuration was resolved for
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Full connection URL; `${VAR}` is expanded at load time
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Explicit database name, otherwise `bundlr_<environment>`
    #[serde(default)]
    pub database: Option<String>,
    #[serde(
        default = "default_pool",
        deserialize_with = "deserialize_pool_config"
    )]
    pub pool: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default)]
    pub skip_migrations: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_username() -> String {
    "bundlr".to_string()
}

fn default_pool() -> u32 {
    DEFAULT_DATABASE_POOL
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECONDS
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: String::new(),
            database: None,
            pool: default_pool(),
            connect_timeout_seconds: default_connect_timeout(),
            skip_migrations: false,
        }
    }
}

impl DatabaseConfig {
    /// Get database name for the given environment
    pub fn database_name(&self, environment: &str) -> String {
        match &self.database {
            Some(name) => name.clone(),
            None => format!("bundlr_{environment}"),
        }
    }

    /// Explicit URL when configured, otherwise one built from components
    pub fn database_url(&self, environment: &str) -> String {
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            return url.to_string();
        }

        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.database_name(environment)
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Factory engine settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_poll_interval_seconds")]
    pub blocker_poll_interval_seconds: u64,
    #[serde(default = "default_true")]
    pub monitor_enabled: bool,
}

fn default_poll_interval_seconds() -> u64 {
    DEFAULT_BLOCKER_POLL_INTERVAL.as_secs()
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blocker_poll_interval_seconds: default_poll_interval_seconds(),
            monitor_enabled: true,
        }
    }
}

impl PipelineConfig {
    pub fn blocker_poll_interval(&self) -> Duration {
        Duration::from_secs(self.blocker_poll_interval_seconds)
    }
}

/// Lifecycle event channel settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for BundlrConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            pipeline: PipelineConfig::default(),
            events: EventsConfig::default(),
            templates: PipelineTemplate::builtin(),
            environment: default_environment(),
        }
    }
}

impl BundlrConfig {
    /// Validate configuration values and every pipeline template
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.database.pool == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.pool",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.database.url.as_deref().map_or(true, str::is_empty)
            && self.database.host.is_empty()
        {
            return Err(ConfigurationError::missing_required_field(
                "database.host",
                "database configuration without a url",
            ));
        }

        if self.pipeline.blocker_poll_interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "pipeline.blocker_poll_interval_seconds",
                "0",
                "poll interval must be greater than 0",
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }

        if self.templates.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "templates",
                "at least one pipeline template must be configured",
            ));
        }

        TemplateRegistry::new(self.templates.clone())?;
        Ok(())
    }

    /// Get database URL for the configured environment
    pub fn database_url(&self) -> String {
        self.database.database_url(&self.environment)
    }

    /// Registry over the configured templates
    pub fn template_registry(&self) -> ConfigResult<TemplateRegistry> {
        Ok(TemplateRegistry::new(self.templates.clone())?)
    }

    pub fn is_test_environment(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment == "production"
    }
}
