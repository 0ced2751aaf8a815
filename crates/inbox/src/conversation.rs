use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{ConversationId, Patch, Record, UserId};

use crate::message::Message;

pub const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    #[serde(default)]
    pub participants: Vec<UserId>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub unread: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Conversation {
    const TABLE: &'static str = "conversations";
    const KIND: &'static str = "conversation";
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    pub name: String,
    #[serde(default)]
    pub participants: Vec<UserId>,
}

impl NewConversation {
    /// `updated_at` starts at creation time so new conversations sort with
    /// recently active ones.
    pub fn into_conversation(self, now: DateTime<Utc>) -> Conversation {
        let mut participants = self.participants;
        participants.sort();
        participants.dedup();

        Conversation {
            id: ConversationId::new(),
            name: self.name,
            participants,
            last_message: None,
            last_message_time: None,
            status: Some(DEFAULT_STATUS.to_string()),
            unread: 0,
            created_at: now,
            updated_at: Some(now),
        }
    }
}

/// Changes written onto a conversation when a message is posted to it.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationActivity {
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
}

impl Patch for ConversationActivity {}

impl From<&Message> for ConversationActivity {
    fn from(message: &Message) -> Self {
        Self {
            last_message: message.text.clone(),
            last_message_time: message.created_at,
        }
    }
}
