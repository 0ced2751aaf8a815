//! `careops-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod record;

pub use error::{DomainError, DomainResult};
pub use id::{BookingId, ContactId, ConversationId, FormId, InventoryItemId, MessageId, UserId};
pub use record::{Patch, Record, Row, from_row, nullable, to_row};
