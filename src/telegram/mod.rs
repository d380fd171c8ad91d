//! Messaging client module
//!
//! This module defines the capability contract the core uses to talk to the
//! messaging platform, plus the bot-session implementation of it. Session
//! bootstrap (tokens, auth) stays outside the core; a user-session client can
//! implement the same trait without touching anything here.

pub mod bot_session;
pub mod classify;

use async_trait::async_trait;

use crate::models::group::Membership;
use crate::utils::errors::Result;

pub use bot_session::BotSession;
pub use classify::{classify_send_error, SendError};

/// The platform capability the core depends on.
///
/// `list_memberships` reports infrastructure problems through the crate
/// error type and aborts the calling job run. `send_message` never does:
/// every send failure arrives pre-classified as [`SendError`], and the
/// classification is this trait's contract obligation.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Groups the account currently belongs to.
    async fn list_memberships(&self) -> Result<Vec<Membership>>;

    /// Send one message to one group.
    async fn send_message(&self, group_id: i64, text: &str) -> std::result::Result<(), SendError>;
}
