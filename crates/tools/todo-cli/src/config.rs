//! Configuration for the `todo` client
//!
//! Values are read from, in increasing order of precedence:
//! - built-in defaults
//! - a TOML file (`--config`, `TODO_CONFIG_FILE`, or `todo.toml`)
//! - environment variables with the `TODO` prefix, e.g. `TODO__SERVER__URL`
//! - command line flags

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "todo.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub list: ListConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the to-do API (default: http://localhost:3000)
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Per-request timeout; requests never time out when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Name of the list, also the mirror's namespace
    #[serde(default = "default_list_name")]
    pub name: String,

    /// Identity sent at login
    #[serde(default = "default_identity")]
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter string
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_list_name() -> String {
    "developers".to_string()
}

fn default_identity() -> String {
    "Test user".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./todo_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            name: default_list_name(),
            identity: default_identity(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub list: Option<String>,
    pub identity: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an optional file and the environment.
    ///
    /// An explicitly named file must exist; the fallback `todo.toml` is
    /// optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        match explicit_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let config_path = std::env::var("TODO_CONFIG_FILE")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
                if Path::new(&config_path).exists() {
                    info!("Loading configuration from {}", config_path);
                    builder = builder.add_source(File::with_name(&config_path));
                } else {
                    debug!("No config file found at {}, using defaults", config_path);
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TODO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let mut settings: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            debug!("Using RUST_LOG environment variable");
            settings.logging.level = log_level;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Apply command line flags and re-validate.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.server {
            self.server.url = url;
        }
        if let Some(name) = overrides.list {
            self.list.name = name;
        }
        if let Some(identity) = overrides.identity {
            self.list.identity = identity;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.storage.data_dir = data_dir;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            anyhow::bail!("Server URL cannot be empty");
        }
        Url::parse(&self.server.url)
            .with_context(|| format!("Invalid server URL '{}'", self.server.url))?;

        if self.server.timeout_seconds == Some(0) {
            anyhow::bail!("Request timeout must be greater than 0 when set");
        }

        if self.list.name.trim().is_empty() {
            anyhow::bail!("List name cannot be empty");
        }

        // A full filter string is passed to EnvFilter as-is
        if !self.logging.level.contains('=') && !self.logging.level.contains(',') {
            let valid_levels = ["off", "trace", "debug", "info", "warn", "error"];
            let level_lower = self.logging.level.to_lowercase();
            if !valid_levels.contains(&level_lower.as_str()) {
                anyhow::bail!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level,
                    valid_levels
                );
            }
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.server.timeout_seconds.map(Duration::from_secs)
    }

    /// Filter string for `tracing_subscriber::EnvFilter`.
    pub fn log_filter(&self) -> String {
        if self.logging.level.contains('=') || self.logging.level.contains(',') {
            self.logging.level.clone()
        } else {
            let level = self.logging.level.to_lowercase();
            if level == "off" {
                return level;
            }
            format!(
                "todo={level},todo_core={level},todo_rest_client={level},todo_store={level},todo_view={level},warn"
            )
        }
    }
}
