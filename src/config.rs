//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::EnergyMetric;
use crate::provider::EnergyProvider;
use crate::service::{EnergyCorrection, HealthDataService};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Optional bias correction for one metric
    pub correction: Option<CorrectionConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which metrics get a cache of their own
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracked_metrics")]
    pub metrics: Vec<EnergyMetric>,
}

fn default_tracked_metrics() -> Vec<EnergyMetric> {
    vec![EnergyMetric::ActiveEnergy, EnergyMetric::BasalEnergy]
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            metrics: default_tracked_metrics(),
        }
    }
}

/// Constant per-day offset for a metric with a known systematic bias
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionConfig {
    pub metric: EnergyMetric,
    pub delta_kcal_per_day: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("burnrate").join("config.toml")),
            Some(PathBuf::from("./burnrate.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("BURNRATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("BURNRATE_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(delta) = std::env::var("BURNRATE_CORRECTION_DELTA") {
            if let (Ok(delta), Some(correction)) = (delta.parse(), self.correction.as_mut()) {
                correction.delta_kcal_per_day = delta;
            }
        }
    }

    /// Wire a query facade from this configuration
    pub fn build_service<P: EnergyProvider>(&self, provider: Arc<P>) -> HealthDataService<P> {
        let service = HealthDataService::new(provider, &self.tracking.metrics);
        match &self.correction {
            Some(correction) => service.with_correction(EnergyCorrection {
                metric: correction.metric,
                delta_kcal_per_day: correction.delta_kcal_per_day,
            }),
            None => service,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            correction: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Burnrate Configuration
#
# Environment variables override these settings:
# - BURNRATE_LOG_LEVEL
# - BURNRATE_LOG_FORMAT
# - BURNRATE_CORRECTION_DELTA

[tracking]
# Metrics that get an aggregation cache: active_energy, basal_energy
metrics = ["active_energy", "basal_energy"]

# Optional constant offset for a metric with a known bias in the source
# [correction]
# metric = "basal_energy"
# delta_kcal_per_day = -120.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
