//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! Service settings come from environment variables at startup; the `.env`
//! file is used for local development. Metric tunables live in an optional TOML
//! file named by `METRICS_CONFIG_PATH`.

use exam_tracker_core::MetricsConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};

/// OpenAI-compatible endpoint used when only a Gemini key is configured.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Could not read metrics config {0}: {1}")]
    Unreadable(PathBuf, std::io::Error),
    #[error("Invalid metrics config {0}: {1}")]
    InvalidToml(PathBuf, toml::de::Error),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub metrics_config_path: Option<PathBuf>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub recommendation_model: String,
    pub recommendation_base_url: Option<String>,
    pub recommendation_timeout: Duration,
    pub cors_origin: String,
}

/// Credentials and endpoint for the recommendation model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationEndpoint {
    pub api_key: String,
    /// `None` keeps the client's default OpenAI endpoint.
    pub base_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let metrics_config_path = std::env::var("METRICS_CONFIG_PATH").ok().map(PathBuf::from);

        // --- Load API Keys (as optional) ---
        let openai_api_key = non_empty_var("OPENAI_API_KEY");
        let gemini_api_key = non_empty_var("GEMINI_API_KEY");

        // --- Load Recommendation Settings ---
        let recommendation_model = std::env::var("RECOMMENDATION_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let recommendation_base_url = non_empty_var("RECOMMENDATION_BASE_URL");

        let timeout_str =
            std::env::var("RECOMMENDATION_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "RECOMMENDATION_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a whole number of seconds", timeout_str),
            )
        })?;

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            metrics_config_path,
            openai_api_key,
            gemini_api_key,
            recommendation_model,
            recommendation_base_url,
            recommendation_timeout: Duration::from_secs(timeout_secs),
            cors_origin,
        })
    }

    /// Picks the key and endpoint for recommendations. An OpenAI key wins over a
    /// Gemini key; a Gemini key alone targets Gemini's OpenAI-compatible API.
    /// An explicit base URL always overrides the default endpoint.
    pub fn recommendation_endpoint(&self) -> Option<RecommendationEndpoint> {
        let (api_key, default_base) = match (&self.openai_api_key, &self.gemini_api_key) {
            (Some(key), _) => (key.clone(), None),
            (None, Some(key)) => (key.clone(), Some(GEMINI_OPENAI_BASE_URL.to_string())),
            (None, None) => return None,
        };

        Some(RecommendationEndpoint {
            api_key,
            base_url: self.recommendation_base_url.clone().or(default_base),
        })
    }

    /// The metric tunables, from the configured TOML file or the built-in defaults.
    pub fn load_metrics_config(&self) -> Result<MetricsConfig, ConfigError> {
        match &self.metrics_config_path {
            Some(path) => load_metrics_file(path),
            None => {
                info!("METRICS_CONFIG_PATH not set, using default metrics configuration");
                Ok(MetricsConfig::default())
            }
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load_metrics_file(path: &Path) -> Result<MetricsConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Unreadable(path.to_path_buf(), e))?;
    let config = toml::from_str(&text).map_err(|e| ConfigError::InvalidToml(path.to_path_buf(), e))?;
    info!(path = %path.display(), "Loaded metrics configuration");
    Ok(config)
}
