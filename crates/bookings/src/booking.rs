use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{BookingId, Patch, Record, UserId};

pub const DEFAULT_DURATION: &str = "60 min";

/// Lifecycle stage of a booking.
///
/// Any stage may follow any other; callers drive the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no-show",
        }
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub service: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub assigned_staff_id: Option<UserId>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Booking {
    const TABLE: &'static str = "bookings";
    const KIND: &'static str = "booking";
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

/// Create payload. Status is always `pending` on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub service: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, created_by: UserId, now: DateTime<Utc>) -> Booking {
        Booking {
            id: BookingId::new(),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            service: self.service,
            date: self.date,
            time: self.time,
            duration: Some(self.duration),
            location: Some(self.location),
            status: BookingStatus::Pending,
            assigned_staff_id: None,
            notes: self.notes,
            created_by: Some(created_by),
            created_at: now,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_staff_id: Option<Option<UserId>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Patch for BookingPatch {}
