//! Contacts domain module (customer address book).
//!
//! `bookings_count` and `total_revenue` are maintained outside this crate and
//! only ever initialised here.

pub mod contact;

pub use contact::{Contact, ContactPatch, ContactStatus, NewContact};
