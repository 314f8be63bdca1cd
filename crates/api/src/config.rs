//! Application configuration
//!
//! Layered with the `config` crate: an optional file, then environment
//! variables such as `CRIME_RISK__MODEL__ARTIFACT_PATH`.

use ::config::{Config, ConfigError, Environment, File};
use feature_engine::AlignmentPolicy;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::rate_limit::RateLimitConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CRIME_RISK";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: String,
    /// Largest accepted request body (bytes)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_upload_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Model and reference data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// JSON model artifact (centroids, optional normalization)
    pub artifact_path: String,
    /// Cleaned crime CSV used for the cluster summary and, when the artifact
    /// has no normalization, for fitting it
    pub reference_data_path: Option<String>,
    /// How to handle inputs of the wrong width
    pub alignment: AlignmentPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "models/crime_clusters.json".to_string(),
            reference_data_path: None,
            alignment: AlignmentPolicy::Lenient,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed `level`
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.level.parse::<Level>().map_err(|_| {
            ConfigError::Message(format!(
                "logging.level: unknown level {:?} (expected trace, debug, info, warn or error)",
                self.level
            ))
        })
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus the environment
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;
        config.logging.max_level()?;
        Ok(config)
    }
}
