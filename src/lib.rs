//! GroupHerald Telegram Outreach Coordinator
//!
//! Coordinates outreach to a fleet of Telegram groups on behalf of one
//! controlled account: discovers which groups the account belongs to,
//! periodically dispatches templated messages to the qualifying subset with
//! pacing and failure backoff, and aggregates fleet-wide statistics.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod telegram;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{GroupHeraldError, Result};

// Re-export main components for easy access
pub use database::{GroupRepository, GroupStore};
pub use scheduler::{JobKind, JobOutcome, JobReport, JobSet, Orchestrator};
pub use services::{GroupDiscovery, MessageDispatcher, StatsAggregator, StatsPublisher};
pub use telegram::{BotSession, MessagingClient, SendError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
