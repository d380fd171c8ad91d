//! Scripted messaging client
//!
//! Fake implementation of the messaging client contract. Membership listings
//! and per-group send outcomes are scripted up front; sends are recorded for
//! assertions. An optional gate lets a test hold a send in flight, which is
//! how the single-flight and shutdown paths are pinned down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use GroupHerald::models::Membership;
use GroupHerald::telegram::{MessagingClient, SendError};
use GroupHerald::utils::errors::{GroupHeraldError, Result};

/// Rendezvous for holding one send in flight: `entered` fires when a send
/// starts, the send then parks until `release` fires.
#[derive(Default)]
pub struct SendGate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct ScriptClient {
    memberships: Mutex<Vec<Membership>>,
    listing_fails: AtomicBool,
    scripted: Mutex<HashMap<i64, Vec<std::result::Result<(), SendError>>>>,
    sent: Mutex<Vec<(i64, String)>>,
    gate: Option<Arc<SendGate>>,
}

impl ScriptClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(gate: Arc<SendGate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn set_memberships(&self, memberships: Vec<Membership>) {
        *self.memberships.lock().unwrap() = memberships;
    }

    /// Make the next `list_memberships` calls fail like a connectivity loss.
    pub fn fail_listing(&self, fail: bool) {
        self.listing_fails.store(fail, Ordering::SeqCst);
    }

    /// Queue outcomes for a group; consumed in order, then sends succeed.
    pub fn script_sends(&self, group_id: i64, outcomes: Vec<std::result::Result<(), SendError>>) {
        self.scripted.lock().unwrap().insert(group_id, outcomes);
    }

    /// Every (group_id, text) pair attempted so far, in send order.
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingClient for ScriptClient {
    async fn list_memberships(&self) -> Result<Vec<Membership>> {
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(GroupHeraldError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "scripted connectivity failure",
            )));
        }
        Ok(self.memberships.lock().unwrap().clone())
    }

    async fn send_message(&self, group_id: i64, text: &str) -> std::result::Result<(), SendError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.sent.lock().unwrap().push((group_id, text.to_string()));

        let next = {
            let mut scripted = self.scripted.lock().unwrap();
            match scripted.get_mut(&group_id) {
                Some(outcomes) if !outcomes.is_empty() => Some(outcomes.remove(0)),
                _ => None,
            }
        };
        next.unwrap_or(Ok(()))
    }
}
