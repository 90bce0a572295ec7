//! Configuration loading for the strategy backtester.
//!
//! YAML files with `${VAR}` / `${VAR:-default}` environment interpolation.
//! Every section is optional and falls back to its defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strategy_backtester::config::load_config;
//!
//! // Load from default path (backtest.yaml)
//! let config = load_config(None)?;
//!
//! println!("risk per trade: {}%", config.backtest.risk_per_trade);
//! ```

mod observability;

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtest::BacktestConfig;
use crate::backtest::parallel::BatchPolicy;

pub use observability::{LoggingConfig, init_tracing};

/// Default config file name.
pub const DEFAULT_CONFIG_PATH: &str = "backtest.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Where candle files are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory scanned for `*.csv` candle files.
    pub directory: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared single-run settings.
    #[serde(default)]
    pub backtest: BacktestConfig,
    /// Batch concurrency and telemetry.
    #[serde(default)]
    pub batch: BatchPolicy,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Candle input.
    #[serde(default)]
    pub data: DataConfig,
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `path` defaults to `backtest.yaml`.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
pub fn load_config_from_string(yaml: &str) -> Result<AppConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: AppConfig = if interpolated.trim().is_empty() {
        AppConfig::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset variables
/// without a default become empty.
#[allow(clippy::expect_used)]
fn interpolate_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    config
        .backtest
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    if config.batch.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "batch.batch_size must be at least 1".to_string(),
        ));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !observability::VALID_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.level must be one of: {:?}",
            observability::VALID_LEVELS
        )));
    }

    let format = config.logging.format.to_ascii_lowercase();
    if !observability::VALID_FORMATS.contains(&format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.format must be one of: {:?}",
            observability::VALID_FORMATS
        )));
    }

    Ok(())
}
