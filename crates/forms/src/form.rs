use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use careops_core::{BookingId, DomainError, DomainResult, FormId, Patch, Record, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Pending,
    Completed,
    Overdue,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Pending => "pending",
            FormStatus::Completed => "completed",
            FormStatus::Overdue => "overdue",
        }
    }
}

/// Percentage of completed fields, rounded down.
///
/// A form with no fields has no defined progress; this is reported as
/// [`DomainError::DivisionByZero`]. `completed > total` is not clamped.
pub fn form_progress(completed: u32, total: u32) -> DomainResult<u32> {
    if total == 0 {
        return Err(DomainError::DivisionByZero("form progress"));
    }
    let pct = u64::from(completed) * 100 / u64::from(total);
    Ok(u32::try_from(pct).unwrap_or(u32::MAX))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    pub name: String,
    pub customer_name: String,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    pub status: FormStatus,
    pub progress: u32,
    pub fields: u32,
    pub completed_fields: u32,
    #[serde(default)]
    pub form_data: Option<Value>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Form {
    const TABLE: &'static str = "forms";
    const KIND: &'static str = "form";
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewForm {
    pub name: String,
    pub customer_name: String,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    /// Total number of fields on the form.
    #[serde(default)]
    pub fields: u32,
}

impl NewForm {
    pub fn into_form(self, created_by: UserId, now: DateTime<Utc>) -> Form {
        Form {
            id: FormId::new(),
            name: self.name,
            customer_name: self.customer_name,
            booking_id: self.booking_id,
            status: FormStatus::Pending,
            progress: 0,
            fields: self.fields,
            completed_fields: 0,
            form_data: None,
            submitted_at: None,
            created_by: Some(created_by),
            created_at: now,
            updated_at: None,
        }
    }
}

/// Partial update. `progress` is never accepted from clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FormStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_fields: Option<u32>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub form_data: Option<Option<Value>>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    progress: Option<u32>,
}

impl Patch for FormPatch {}

impl FormPatch {
    /// Recompute progress against the stored field total when the update
    /// carries `completed_fields`.
    pub fn with_derived_progress(mut self, existing: &Form) -> DomainResult<Self> {
        self.progress = match self.completed_fields {
            Some(completed) => Some(form_progress(completed, existing.fields)?),
            None => None,
        };
        Ok(self)
    }

    pub fn derived_progress(&self) -> Option<u32> {
        self.progress
    }
}
