use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{ConversationId, MessageId, Record, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub text: String,
    #[serde(default)]
    pub is_me: bool,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Message {
    const TABLE: &'static str = "messages";
    const KIND: &'static str = "message";
}

/// Author of an outgoing message, taken from the resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub text: String,
}

impl NewMessage {
    pub fn into_message(self, sender: Sender, now: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new(),
            conversation_id: self.conversation_id,
            sender_id: Some(sender.id),
            sender_name: Some(sender.name),
            text: self.text,
            is_me: true,
            is_read: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_message_is_mine_and_unread() {
        let sender = Sender { id: UserId::new(), name: "sam".into() };
        let msg = NewMessage {
            conversation_id: ConversationId::new(),
            text: "hello".into(),
        }
        .into_message(sender.clone(), Utc::now());

        assert!(msg.is_me);
        assert!(!msg.is_read);
        assert_eq!(msg.sender_id, Some(sender.id));
        assert_eq!(msg.sender_name.as_deref(), Some("sam"));
    }
}
