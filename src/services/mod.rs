//! Services module
//!
//! This module contains the business logic services: discovery, dispatch
//! and stats aggregation, plus the Redis publisher the aggregator uses.

pub mod discovery;
pub mod dispatcher;
pub mod publisher;
pub mod stats;

// Re-export commonly used services
pub use discovery::GroupDiscovery;
pub use dispatcher::{BackoffPolicy, MessageDispatcher};
pub use publisher::StatsPublisher;
pub use stats::StatsAggregator;
