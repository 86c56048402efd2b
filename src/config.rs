//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "yatter.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://yatter.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub media: MediaStorageConfig,
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MediaStorageConfig {
    /// Directory uploaded files are written into
    pub root: PathBuf,
    /// Public URL the media root is served from
    /// e.g., "https://media.example.com"
    pub public_url: String,
}

/// Timeline behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    /// Whether the home timeline also contains the requester's own statuses
    #[serde(default = "default_home_includes_own_statuses")]
    pub home_includes_own_statuses: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            home_includes_own_statuses: default_home_includes_own_statuses(),
        }
    }
}

fn default_home_includes_own_statuses() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set
    pub fn default_filter(&self) -> String {
        format!("yatter={},tower_http=debug", self.level.to_ascii_lowercase())
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (YATTER__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.domain", "localhost:8080")?
            .set_default("server.protocol", "http")?
            .set_default("database.path", "data/yatter.db")?
            .set_default("storage.media.root", "data/media")?
            .set_default("storage.media.public_url", "http://localhost:8080/media")?
            .set_default("timeline.home_includes_own_statuses", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("YATTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.storage.media.root.as_os_str().is_empty() {
            return Err(crate::error::AppError::Config(
                "storage.media.root must not be empty".to_string(),
            ));
        }

        if let Err(error) = url::Url::parse(&self.storage.media.public_url) {
            return Err(crate::error::AppError::Config(format!(
                "storage.media.public_url is not a valid URL: {error}"
            )));
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error, got {:?}",
                self.logging.level
            )));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        Ok(())
    }
}
