//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub telegram: TelegramConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub token: String,
    /// Roster of group ids the account is expected to belong to. A bot
    /// session cannot list its own dialogs, so discovery probes these.
    pub group_ids: Vec<i64>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration for stats publishing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Dispatch pacing, backoff and message templates
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Delay between consecutive sends within one run.
    #[serde(default = "default_pacing_seconds")]
    pub pacing_seconds: u64,
    /// Suppression window after the first transient failure; doubles per
    /// consecutive failure.
    #[serde(default = "default_backoff_base_seconds")]
    pub backoff_base_seconds: u64,
    /// Ceiling the doubling never exceeds.
    #[serde(default = "default_backoff_max_seconds")]
    pub backoff_max_seconds: u64,
    /// Message templates; one is chosen at random per send.
    pub messages: Vec<String>,
}

/// Job cadences and concurrency bound
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_discovery_interval_secs")]
    pub discovery_interval_secs: u64,
    #[serde(default = "default_dispatch_interval_secs")]
    pub dispatch_interval_secs: u64,
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to daily-rolling files here.
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_pacing_seconds() -> u64 {
    10
}

fn default_backoff_base_seconds() -> u64 {
    300
}

fn default_backoff_max_seconds() -> u64 {
    28_800
}

fn default_discovery_interval_secs() -> u64 {
    1_800
}

fn default_dispatch_interval_secs() -> u64 {
    300
}

fn default_stats_interval_secs() -> u64 {
    900
}

fn default_max_concurrent_jobs() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("GROUPHERALD"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::GroupHeraldError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig {
                token: String::new(),
                group_ids: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/groupherald".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: None,
            dispatch: DispatchConfig::default(),
            scheduler: SchedulerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pacing_seconds: default_pacing_seconds(),
            backoff_base_seconds: default_backoff_base_seconds(),
            backoff_max_seconds: default_backoff_max_seconds(),
            messages: vec![],
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            discovery_interval_secs: default_discovery_interval_secs(),
            dispatch_interval_secs: default_dispatch_interval_secs(),
            stats_interval_secs: default_stats_interval_secs(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}
