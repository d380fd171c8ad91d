//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{GroupHeraldError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_telegram_config(&settings.telegram)?;
    validate_database_config(&settings.database)?;
    validate_dispatch_config(&settings.dispatch)?;
    validate_scheduler_config(&settings.scheduler)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref redis_config) = settings.redis {
        validate_redis_config(redis_config)?;
    }

    Ok(())
}

/// Validate Telegram configuration
fn validate_telegram_config(config: &super::TelegramConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(GroupHeraldError::Config(
            "Telegram token is required".to_string()
        ));
    }

    if config.group_ids.is_empty() {
        return Err(GroupHeraldError::Config(
            "At least one target group ID must be configured".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(GroupHeraldError::Config(
            "Database URL is required".to_string()
        ));
    }

    url::Url::parse(&config.url)?;

    if config.max_connections == 0 {
        return Err(GroupHeraldError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(GroupHeraldError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(GroupHeraldError::Config(
            "Redis URL is required".to_string()
        ));
    }

    url::Url::parse(&config.url)?;

    if config.ttl_seconds == 0 {
        return Err(GroupHeraldError::Config(
            "Redis TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate dispatch configuration
fn validate_dispatch_config(config: &super::DispatchConfig) -> Result<()> {
    if config.messages.is_empty() {
        return Err(GroupHeraldError::Config(
            "At least one message template must be configured".to_string()
        ));
    }

    if config.messages.iter().any(|m| m.trim().is_empty()) {
        return Err(GroupHeraldError::Config(
            "Message templates cannot be empty".to_string()
        ));
    }

    if config.backoff_base_seconds == 0 {
        return Err(GroupHeraldError::Config(
            "Backoff base must be greater than 0".to_string()
        ));
    }

    if config.backoff_max_seconds < config.backoff_base_seconds {
        return Err(GroupHeraldError::Config(
            "Backoff maximum cannot be below the backoff base".to_string()
        ));
    }

    Ok(())
}

/// Validate scheduler configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    let intervals = [
        ("discovery", config.discovery_interval_secs),
        ("dispatch", config.dispatch_interval_secs),
        ("stats", config.stats_interval_secs),
    ];
    for (name, interval) in intervals {
        if interval == 0 {
            return Err(GroupHeraldError::Config(
                format!("The {} interval must be greater than 0", name)
            ));
        }
    }

    if config.max_concurrent_jobs == 0 {
        return Err(GroupHeraldError::Config(
            "Max concurrent jobs must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(GroupHeraldError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(GroupHeraldError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if let Some(ref file_path) = config.file_path {
        if file_path.is_empty() {
            return Err(GroupHeraldError::Config(
                "Log file path cannot be empty when set".to_string()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.telegram.token = "123456:TEST".to_string();
        settings.telegram.group_ids = vec![-1001234567890];
        settings.dispatch.messages = vec!["Hello there".to_string()];
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.telegram.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_empty_roster_rejected() {
        let mut settings = valid_settings();
        settings.telegram.group_ids.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_empty_templates_rejected() {
        let mut settings = valid_settings();
        settings.dispatch.messages.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_backoff_max_below_base_rejected() {
        let mut settings = valid_settings();
        settings.dispatch.backoff_base_seconds = 600;
        settings.dispatch.backoff_max_seconds = 300;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut settings = valid_settings();
        settings.scheduler.dispatch_interval_secs = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
