//! Bot-session messaging client
//!
//! Implements the messaging client contract over a teloxide `Bot`. A bot
//! session cannot enumerate its own dialogs, so membership listing probes a
//! configured roster of group ids: every probe answered is a membership,
//! every probe refused with a permanent error is treated as "not a member",
//! and a transient probe error aborts the listing so the run retries later.

use async_trait::async_trait;
use teloxide::{Bot, types::ChatId, requests::Requester, prelude::Request};
use tracing::debug;

use crate::models::group::Membership;
use crate::telegram::classify::{classify_send_error, SendError};
use crate::telegram::MessagingClient;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct BotSession {
    bot: Bot,
    roster: Vec<i64>,
}

impl BotSession {
    /// Create a new BotSession over a configured group roster
    pub fn new(bot: Bot, roster: Vec<i64>) -> Self {
        Self { bot, roster }
    }

    async fn probe_group(&self, group_id: i64) -> Result<Option<Membership>> {
        let chat_id = ChatId(group_id);

        let chat = match self.bot.get_chat(chat_id).send().await {
            Ok(chat) => chat,
            Err(err) => return absent_on_permanent(group_id, err),
        };
        let member_count = match self.bot.get_chat_member_count(chat_id).send().await {
            Ok(count) => count,
            Err(err) => return absent_on_permanent(group_id, err),
        };

        let name = chat
            .title()
            .map(str::to_owned)
            .unwrap_or_else(|| group_id.to_string());

        Ok(Some(Membership {
            group_id,
            name,
            member_count: member_count as i32,
        }))
    }
}

/// A permanent probe failure means the account is simply not in that group
/// anymore; a transient one aborts the whole listing.
fn absent_on_permanent(group_id: i64, err: teloxide::RequestError) -> Result<Option<Membership>> {
    match classify_send_error(&err) {
        SendError::Permanent(reason) => {
            debug!(group_id = group_id, reason = %reason, "Probe treats group as absent");
            Ok(None)
        }
        SendError::Transient(_) => Err(err.into()),
    }
}

#[async_trait]
impl MessagingClient for BotSession {
    async fn list_memberships(&self) -> Result<Vec<Membership>> {
        let mut memberships = Vec::with_capacity(self.roster.len());
        for &group_id in &self.roster {
            if let Some(membership) = self.probe_group(group_id).await? {
                memberships.push(membership);
            }
        }
        Ok(memberships)
    }

    async fn send_message(&self, group_id: i64, text: &str) -> std::result::Result<(), SendError> {
        self.bot
            .send_message(ChatId(group_id), text)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| classify_send_error(&err))
    }
}
