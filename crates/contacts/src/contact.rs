use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{ContactId, Patch, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Active,
    Inactive,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Active => "active",
            ContactStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ContactStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub bookings_count: i64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const KIND: &'static str = "contact";
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewContact {
    /// New contacts start active with no booking history.
    pub fn into_contact(self, now: DateTime<Utc>) -> Contact {
        Contact {
            id: ContactId::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            status: ContactStatus::Active,
            tags: self.tags,
            bookings_count: 0,
            total_revenue: 0.0,
            last_interaction: None,
            notes: self.notes,
            created_at: now,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Patch for ContactPatch {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_contact_gets_defaults() {
        let new: NewContact = serde_json::from_value(json!({
            "name": "Grace",
            "email": "grace@example.com",
            "phone": "+1 555 0100"
        }))
        .unwrap();
        let contact = new.into_contact(Utc::now());

        assert_eq!(contact.status, ContactStatus::Active);
        assert_eq!(contact.bookings_count, 0);
        assert_eq!(contact.total_revenue, 0.0);
        assert!(contact.tags.is_empty());
        assert!(contact.last_interaction.is_none());
    }

    #[test]
    fn patch_cannot_touch_maintained_counters() {
        let patch: ContactPatch = serde_json::from_value(json!({
            "status": "inactive",
            "bookings_count": 99,
            "total_revenue": 1e6
        }))
        .unwrap();
        let changes = patch.changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["status"], "inactive");
    }

    #[test]
    fn tags_replace_wholesale() {
        let patch = ContactPatch {
            tags: Some(vec!["vip".into()]),
            ..Default::default()
        };
        assert_eq!(patch.changes().unwrap()["tags"], json!(["vip"]));
    }
}
