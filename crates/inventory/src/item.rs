use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{InventoryItemId, Patch, Record};

/// Stock alert level. Always derived, never client-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryStatus {
    Normal,
    Low,
    Critical,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Normal => "normal",
            InventoryStatus::Low => "low",
            InventoryStatus::Critical => "critical",
        }
    }

    /// Statuses that show up on the alert list.
    pub const ALERTING: [InventoryStatus; 2] = [InventoryStatus::Low, InventoryStatus::Critical];
}

/// Derive the alert level from stock on hand and the reorder threshold.
///
/// - `available == 0` → critical
/// - `0 < available <= threshold` → low
/// - otherwise → normal
pub fn inventory_status(available: u32, threshold: u32) -> InventoryStatus {
    if available == 0 {
        InventoryStatus::Critical
    } else if available <= threshold {
        InventoryStatus::Low
    } else {
        InventoryStatus::Normal
    }
}

/// Persisted stock item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    pub category: String,
    pub available: u32,
    pub threshold: u32,
    pub status: InventoryStatus,
    pub usage_per_booking: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for InventoryItem {
    const TABLE: &'static str = "inventory";
    const KIND: &'static str = "item";
}

fn default_threshold() -> u32 {
    10
}

fn default_usage() -> f64 {
    1.0
}

/// Create payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub available: u32,
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_usage")]
    pub usage_per_booking: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

impl NewInventoryItem {
    pub fn into_item(self, now: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(),
            status: inventory_status(self.available, self.threshold),
            name: self.name,
            category: self.category,
            available: self.available,
            threshold: self.threshold,
            usage_per_booking: self.usage_per_booking,
            supplier: self.supplier,
            unit_price: self.unit_price,
            last_restocked: None,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Partial update. `status` is not accepted from clients; it is filled in by
/// [`InventoryPatch::with_derived_status`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_per_booking: Option<f64>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_restocked: Option<Option<DateTime<Utc>>>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    status: Option<InventoryStatus>,
}

impl Patch for InventoryPatch {}

impl InventoryPatch {
    pub fn touches_stock_levels(&self) -> bool {
        self.available.is_some() || self.threshold.is_some()
    }

    /// Recompute the status from the merged (existing + incoming) stock levels
    /// when either input changes.
    pub fn with_derived_status(mut self, existing: &InventoryItem) -> Self {
        self.status = if self.touches_stock_levels() {
            let available = self.available.unwrap_or(existing.available);
            let threshold = self.threshold.unwrap_or(existing.threshold);
            Some(inventory_status(available, threshold))
        } else {
            None
        };
        self
    }

    pub fn derived_status(&self) -> Option<InventoryStatus> {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(available: u32, threshold: u32) -> InventoryItem {
        NewInventoryItem {
            name: "Shampoo".into(),
            category: "Supplies".into(),
            available,
            threshold,
            usage_per_booking: 1.0,
            supplier: None,
            unit_price: Some(4.5),
        }
        .into_item(Utc::now())
    }

    #[test]
    fn status_examples() {
        assert_eq!(inventory_status(0, 0), InventoryStatus::Critical);
        assert_eq!(inventory_status(0, 10), InventoryStatus::Critical);
        assert_eq!(inventory_status(1, 10), InventoryStatus::Low);
        assert_eq!(inventory_status(10, 10), InventoryStatus::Low);
        assert_eq!(inventory_status(11, 10), InventoryStatus::Normal);
        assert_eq!(inventory_status(1, 0), InventoryStatus::Normal);
    }

    #[test]
    fn create_derives_status() {
        assert_eq!(item(0, 5).status, InventoryStatus::Critical);
        assert_eq!(item(3, 5).status, InventoryStatus::Low);
        assert_eq!(item(30, 5).status, InventoryStatus::Normal);
    }

    #[test]
    fn create_defaults_apply() {
        let body = serde_json::json!({"name": "Towels", "category": "Linen"});
        let new: NewInventoryItem = serde_json::from_value(body).unwrap();
        assert_eq!(new.available, 0);
        assert_eq!(new.threshold, 10);
        assert_eq!(new.usage_per_booking, 1.0);
        assert_eq!(new.into_item(Utc::now()).status, InventoryStatus::Critical);
    }

    #[test]
    fn dropping_stock_to_zero_flips_to_critical() {
        let existing = item(50, 10);
        let patch = InventoryPatch {
            available: Some(0),
            ..Default::default()
        }
        .with_derived_status(&existing);
        let changes = patch.changes().unwrap();
        assert_eq!(changes["available"], 0);
        assert_eq!(changes["status"], "critical");
    }

    #[test]
    fn threshold_change_uses_existing_available() {
        let existing = item(8, 5);
        let patch = InventoryPatch {
            threshold: Some(8),
            ..Default::default()
        }
        .with_derived_status(&existing);
        assert_eq!(patch.derived_status(), Some(InventoryStatus::Low));
    }

    #[test]
    fn unrelated_change_leaves_status_alone() {
        let existing = item(0, 5);
        let patch = InventoryPatch {
            name: Some("Conditioner".into()),
            ..Default::default()
        }
        .with_derived_status(&existing);
        let changes = patch.changes().unwrap();
        assert!(!changes.contains_key("status"));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn client_status_is_ignored() {
        let body = serde_json::json!({"status": "normal", "available": 0});
        let patch: InventoryPatch = serde_json::from_value(body).unwrap();
        let patch = patch.with_derived_status(&item(20, 5));
        assert_eq!(patch.derived_status(), Some(InventoryStatus::Critical));
    }

    proptest! {
        #[test]
        fn status_matches_definition(available in 0u32..10_000, threshold in 0u32..10_000) {
            let status = inventory_status(available, threshold);
            if available == 0 {
                prop_assert_eq!(status, InventoryStatus::Critical);
            } else if available <= threshold {
                prop_assert_eq!(status, InventoryStatus::Low);
            } else {
                prop_assert_eq!(status, InventoryStatus::Normal);
            }
        }

        #[test]
        fn zero_stock_is_always_critical(threshold in any::<u32>()) {
            prop_assert_eq!(inventory_status(0, threshold), InventoryStatus::Critical);
        }
    }

    #[test]
    fn explicit_null_clears_supplier() {
        let patch: InventoryPatch =
            serde_json::from_value(serde_json::json!({"supplier": null, "unit_price": 3.5}))
                .unwrap();
        let changes = patch.with_derived_status(&item(5, 5)).changes().unwrap();
        assert_eq!(changes["supplier"], serde_json::Value::Null);
        assert_eq!(changes["unit_price"], 3.5);
        assert!(!changes.contains_key("last_restocked"));
    }
}
