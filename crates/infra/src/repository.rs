//! Typed helpers over any [`Store`].
//!
//! Records are mapped to and from rows through serde; table names come from
//! [`Record::TABLE`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use careops_core::{Patch, Record, from_row, to_row};

use crate::store::{Query, Store, StoreError};

fn decode<T: Record>(row: careops_core::Row) -> Result<T, StoreError> {
    from_row(row).map_err(|e| StoreError::Decode {
        kind: T::KIND,
        message: e.to_string(),
    })
}

fn encode_error<T: Record>(e: serde_json::Error) -> StoreError {
    StoreError::Decode {
        kind: T::KIND,
        message: format!("encode: {e}"),
    }
}

pub async fn list<T, S>(store: &S, query: &Query) -> Result<Vec<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    store.select(query).await?.into_iter().map(decode::<T>).collect()
}

/// First row matching `query`, if any.
pub async fn find_one<T, S>(store: &S, query: &Query) -> Result<Option<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    store.select(query).await?.into_iter().next().map(decode::<T>).transpose()
}

pub async fn find_by_id<T, S>(store: &S, id: impl Into<Value>) -> Result<Option<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    find_one(store, &Query::table(T::TABLE).eq("id", id)).await
}

/// Persist a new record and return the stored copy.
///
/// A backend that reports zero written rows is treated as a failure.
pub async fn insert<T, S>(store: &S, record: &T) -> Result<T, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    let row = to_row(record).map_err(encode_error::<T>)?;
    let stored = store.insert(T::TABLE, row).await?;
    match stored.into_iter().next() {
        Some(row) => decode(row),
        None => Err(StoreError::Backend(format!(
            "insert into {} returned no rows",
            T::TABLE
        ))),
    }
}

/// Apply a partial update and refresh `updated_at`.
///
/// Returns `None` when no row has the id.
pub async fn update_by_id<T, P, S>(
    store: &S,
    id: impl Into<Value>,
    patch: &P,
    now: DateTime<Utc>,
) -> Result<Option<T>, StoreError>
where
    T: Record,
    P: Patch + ?Sized,
    S: Store + ?Sized,
{
    let mut changes = patch.changes().map_err(encode_error::<T>)?;
    let stamp = serde_json::to_value(now).map_err(encode_error::<T>)?;
    changes.insert("updated_at".to_string(), stamp);
    update_row(store, id, changes).await
}

/// Apply a partial update as-is, leaving `updated_at` alone.
pub async fn apply_by_id<T, P, S>(
    store: &S,
    id: impl Into<Value>,
    patch: &P,
) -> Result<Option<T>, StoreError>
where
    T: Record,
    P: Patch + ?Sized,
    S: Store + ?Sized,
{
    let changes = patch.changes().map_err(encode_error::<T>)?;
    update_row(store, id, changes).await
}

async fn update_row<T, S>(
    store: &S,
    id: impl Into<Value>,
    changes: careops_core::Row,
) -> Result<Option<T>, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    let query = Query::table(T::TABLE).eq("id", id);
    store.update(&query, changes).await?.into_iter().next().map(decode::<T>).transpose()
}

/// Hard delete. Returns whether a row was removed.
pub async fn delete_by_id<T, S>(store: &S, id: impl Into<Value>) -> Result<bool, StoreError>
where
    T: Record,
    S: Store + ?Sized,
{
    let removed = store.delete(&Query::table(T::TABLE).eq("id", id)).await?;
    Ok(!removed.is_empty())
}
