//! Forms domain module.
//!
//! Intake forms attached to customers (and optionally bookings), with progress
//! derived from the number of completed fields.

pub mod form;

pub use form::{Form, FormPatch, FormStatus, NewForm, form_progress};
