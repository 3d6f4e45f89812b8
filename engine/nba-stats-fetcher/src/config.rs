//! Configuration for the stats fetcher

use anyhow::{Context, Result};
use artifact_store::StoreConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment prefix for overrides, e.g. `NBA_STATS__API__SEASON=2024-25`
pub const ENV_PREFIX: &str = "NBA_STATS";

/// Configuration for the NBA stats fetcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Provider endpoints and pacing
    pub api: ApiConfig,

    /// Retry configuration
    pub retry: RetryConfig,

    /// Where artifacts are written
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Season in provider format (e.g., "2025-26")
    pub season: String,

    /// Season type (e.g., "Regular Season")
    pub season_type: String,

    /// Base URL of the stats endpoints
    pub stats_base_url: String,

    /// Full league schedule document
    pub schedule_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Pause after each player game log request
    pub game_log_delay_ms: u64,

    /// Pause after each player info request
    pub position_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            season: "2025-26".to_string(),
            season_type: "Regular Season".to_string(),
            stats_base_url: "https://stats.nba.com/stats".to_string(),
            schedule_url: "https://cdn.nba.com/static/json/staticData/scheduleLeagueV2.json".to_string(),
            timeout_secs: 30,
            game_log_delay_ms: 300,
            position_delay_ms: 500,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, initial_delay_ms: 1_000, max_delay_ms: 30_000, backoff_multiplier: 2.0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn game_log_delay(&self) -> Duration {
        Duration::from_millis(self.game_log_delay_ms)
    }

    pub fn position_delay(&self) -> Duration {
        Duration::from_millis(self.position_delay_ms)
    }
}

impl FetcherConfig {
    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Self::default()).context("Failed to encode default configuration")?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api.season.trim().is_empty() {
            return Err("Season must not be empty".to_string());
        }

        if self.api.timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err("Backoff multiplier must be at least 1.0".to_string());
        }

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err("Initial retry delay must not exceed the maximum delay".to_string());
        }

        self.store.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = FetcherConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.game_log_delay(), Duration::from_millis(300));
        assert_eq!(config.api.position_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = FetcherConfig::default();
        config.api.season = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fetcher.toml");
        std::fs::write(
            &path,
            r#"
[api]
season = "2024-25"
game_log_delay_ms = 0

[store]
data_dir = "/var/lib/box-scores"
"#,
        )
        .unwrap();

        let config = FetcherConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api.season, "2024-25");
        assert_eq!(config.api.game_log_delay_ms, 0);
        assert_eq!(config.api.position_delay_ms, 500);
        assert_eq!(config.store.data_dir, std::path::PathBuf::from("/var/lib/box-scores"));
        assert_eq!(config.store.players_file, "players.json");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FetcherConfig::load(Some(&temp_dir.path().join("absent.toml"))).is_err());
    }
}
