//! Error handling for GroupHerald
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for GroupHerald application
#[derive(Error, Debug)]
pub enum GroupHeraldError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parsing error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: i64 },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for GroupHerald operations
pub type Result<T> = std::result::Result<T, GroupHeraldError>;

impl GroupHeraldError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            GroupHeraldError::Database(_) => false,
            GroupHeraldError::Migration(_) => false,
            GroupHeraldError::Telegram(_) => true,
            GroupHeraldError::Config(_) => false,
            GroupHeraldError::ConfigParse(_) => false,
            GroupHeraldError::GroupNotFound { .. } => false,
            GroupHeraldError::Redis(_) => true,
            GroupHeraldError::Serialization(_) => false,
            GroupHeraldError::Io(_) => true,
            GroupHeraldError::UrlParse(_) => false,
            GroupHeraldError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GroupHeraldError::Database(_) => ErrorSeverity::Critical,
            GroupHeraldError::Migration(_) => ErrorSeverity::Critical,
            GroupHeraldError::Config(_) => ErrorSeverity::Critical,
            GroupHeraldError::ConfigParse(_) => ErrorSeverity::Critical,
            GroupHeraldError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
