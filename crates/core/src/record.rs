//! Persisted record shape shared by every resource.
//!
//! The backing store speaks in rows: ordered JSON objects keyed by column name.
//! Typed records are converted to and from rows through serde.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A single stored row (column name -> value, insertion ordered).
pub type Row = serde_json::Map<String, Value>;

/// A typed record living in one store table.
pub trait Record: Serialize + DeserializeOwned + Send {
    /// Table the record is persisted in.
    const TABLE: &'static str;

    /// Name used in caller-facing messages ("booking not found").
    const KIND: &'static str;
}

/// Serialize a value into a row. Fails if the value is not a JSON object.
pub fn to_row<T: Serialize + ?Sized>(value: &T) -> Result<Row, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserialize a row into a typed value.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(row))
}

/// Partial-update payload.
///
/// Implementors mark every field `skip_serializing_if = "Option::is_none"` so
/// that only client-supplied fields turn into changes; absent fields are left
/// untouched rather than nulled. Nullable columns use `Option<Option<T>>` with
/// [`nullable`] so an explicit `null` clears the column.
pub trait Patch: Serialize {
    fn changes(&self) -> Result<Row, serde_json::Error> {
        to_row(self)
    }
}

/// Deserialize a present field into `Some(value)`, keeping `Some(None)` for an
/// explicit `null`. Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[derive(Serialize, Default)]
    struct WidgetPatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
    }

    impl Patch for WidgetPatch {}

    #[derive(Serialize, Deserialize, Default)]
    struct NotePatch {
        #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
        note: Option<Option<String>>,
    }

    impl Patch for NotePatch {}

    #[test]
    fn row_keeps_field_order() {
        let row = to_row(&Widget { name: "a".into(), count: 2 }).unwrap();
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "count"]);
        let back: Widget = from_row(row).unwrap();
        assert_eq!(back, Widget { name: "a".into(), count: 2 });
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(to_row(&5u32).is_err());
        assert!(to_row::<[u32]>(&[1, 2][..]).is_err());
    }

    #[test]
    fn patch_only_emits_supplied_fields() {
        let patch = WidgetPatch {
            count: Some(7),
            ..Default::default()
        };
        let changes = patch.changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["count"], 7);
    }

    #[test]
    fn explicit_null_clears_and_absent_is_untouched() {
        let absent: NotePatch = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(absent.changes().unwrap().is_empty());

        let cleared: NotePatch =
            serde_json::from_value(serde_json::json!({"note": null})).unwrap();
        let changes = cleared.changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["note"], Value::Null);

        let set: NotePatch = serde_json::from_value(serde_json::json!({"note": "hi"})).unwrap();
        assert_eq!(set.changes().unwrap()["note"], "hi");
    }
}
