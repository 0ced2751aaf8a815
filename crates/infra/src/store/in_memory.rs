//! In-memory store for tests and local development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use careops_core::Row;

use super::{Filter, FilterOp, Order, Query, Store, StoreError};

/// Table-per-`Vec` row store.
///
/// `id` is unique in every table; further unique columns are registered with
/// [`InMemoryStore::with_unique`]. Null values never collide.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
    unique: HashMap<&'static str, Vec<&'static str>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique(mut self, table: &'static str, column: &'static str) -> Self {
        self.unique.entry(table).or_default().push(column);
        self
    }

    fn unique_columns(&self, table: &'static str) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once("id").chain(self.unique.get(table).into_iter().flatten().copied())
    }

    /// First unique column on which `row` collides with an existing row other
    /// than those at `skip`.
    fn collision(
        &self,
        table: &'static str,
        rows: &[Row],
        row: &Row,
        skip: &[usize],
    ) -> Option<String> {
        self.unique_columns(table).find_map(|column| {
            let value = row.get(column).filter(|v| !v.is_null())?;
            rows.iter()
                .enumerate()
                .filter(|(i, _)| !skip.contains(i))
                .any(|(_, other)| other.get(column).is_some_and(|o| values_equal(o, value)))
                .then(|| format!("{table}.{column}"))
        })
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn column<'a>(row: &'a Row, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (timestamp(x), timestamp(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Timestamps carry a varying number of fractional digits, so they are
/// compared as instants rather than text.
fn timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ord) => ord == Ordering::Equal,
        None => a == b,
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let value = column(row, filter.column);
    match filter.op {
        FilterOp::Eq => !value.is_null() && values_equal(value, &filter.value),
        FilterOp::Gte => matches!(
            compare_values(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lte => matches!(
            compare_values(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::In => match &filter.value {
            Value::Array(candidates) => {
                !value.is_null() && candidates.iter().any(|c| values_equal(value, c))
            }
            _ => false,
        },
    }
}

fn matches_all(row: &Row, query: &Query) -> bool {
    query.filters().iter().all(|f| matches(row, f))
}

/// Nulls sort last ascending and first descending.
fn compare_rows(a: &Row, b: &Row, order: &[Order]) -> Ordering {
    for key in order {
        let (x, y) = (column(a, key.column), column(b, key.column));
        let ord = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_values(x, y).unwrap_or(Ordering::Equal),
        };
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Row> = tables
            .get(query.table_name())
            .into_iter()
            .flatten()
            .filter(|row| matches_all(row, query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, query.ordering()));
        Ok(rows)
    }

    async fn insert(&self, table: &'static str, row: Row) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let rows = tables.entry(table).or_default();
        if let Some(column) = self.collision(table, rows, &row, &[]) {
            return Err(StoreError::Conflict(column));
        }
        rows.push(row.clone());
        Ok(vec![row])
    }

    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(Vec::new());
        };

        let hits: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches_all(row, query))
            .map(|(i, _)| i)
            .collect();

        if let Some(column) = self.collision(query.table_name(), rows, &changes, &hits) {
            return Err(StoreError::Conflict(column));
        }

        let mut updated = Vec::with_capacity(hits.len());
        for i in hits {
            let row = &mut rows[i];
            for (key, value) in &changes {
                row.insert(key.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(Vec::new());
        };

        let (removed, kept): (Vec<Row>, Vec<Row>) =
            rows.drain(..).partition(|row| matches_all(row, query));
        *rows = kept;
        Ok(removed)
    }
}
