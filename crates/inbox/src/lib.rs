//! Inbox domain module: internal conversations and their messages.

pub mod conversation;
pub mod message;

pub use conversation::{Conversation, ConversationActivity, NewConversation, DEFAULT_STATUS};
pub use message::{Message, NewMessage, Sender};
