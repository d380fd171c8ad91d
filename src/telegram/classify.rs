//! Send failure classification
//!
//! Maps raw Telegram API errors onto the two failure classes the core
//! understands. The core never retries a Permanent failure and always
//! retries a Transient one subject to backoff, so a wrongly-permanent
//! verdict silences a group forever. Unknown errors therefore default to
//! Transient.

use teloxide::{ApiError, RequestError};
use thiserror::Error;

/// A send failure, classified by whether a retry can ever succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Rate limiting, network trouble, temporary platform errors. Safe to
    /// retry after backoff.
    #[error("transient send failure: {0}")]
    Transient(String),

    /// Account removed, group deleted, messaging forbidden, peer invalid.
    /// Never safe to retry.
    #[error("permanent send failure: {0}")]
    Permanent(String),
}

/// Classify a Telegram request error.
pub fn classify_send_error(err: &RequestError) -> SendError {
    match err {
        RequestError::Api(api) => classify_api_error(api),
        RequestError::MigrateToChatId(..) => SendError::Permanent(err.to_string()),
        RequestError::RetryAfter(..) => SendError::Transient(err.to_string()),
        RequestError::Network(..) | RequestError::Io(..) => SendError::Transient(err.to_string()),
        _ => SendError::Transient(err.to_string()),
    }
}

fn classify_api_error(api: &ApiError) -> SendError {
    match api {
        ApiError::BotBlocked
        | ApiError::ChatNotFound
        | ApiError::GroupDeactivated
        | ApiError::BotKicked
        | ApiError::BotKickedFromSupergroup
        | ApiError::UserDeactivated
        | ApiError::CantInitiateConversation
        | ApiError::CantTalkWithBots
        | ApiError::NotEnoughRightsToPostMessages => SendError::Permanent(api.to_string()),
        _ => SendError::Transient(api.to_string()),
    }
}
