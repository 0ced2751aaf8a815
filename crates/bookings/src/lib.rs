//! Bookings domain module.
//!
//! Appointment records, their lifecycle status and the status summary read model.

pub mod booking;
pub mod summary;

pub use booking::{Booking, BookingPatch, BookingStatus, DEFAULT_DURATION, NewBooking};
pub use summary::StatusSummary;
