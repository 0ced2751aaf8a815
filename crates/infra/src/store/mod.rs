//! Row store abstraction over the backing relational data service.
//!
//! Handlers talk to the store through a small query model (equality, range
//! and set filters plus ordering) and get rows back as ordered JSON objects.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use careops_core::Row;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column already holds the value.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("store backend error: {0}")]
    Backend(String),

    /// A row could not be mapped to its typed record.
    #[error("failed to decode {kind} row: {message}")]
    Decode { kind: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// `value` holds a JSON array of candidates.
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// A filtered, ordered view over one table.
///
/// Table and column names are static so that they never come from callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: &'static str,
    filters: Vec<Filter>,
    order: Vec<Order>,
}

impl Query {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value.into())
    }

    pub fn gte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value.into())
    }

    pub fn lte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value.into())
    }

    pub fn in_<V, I>(self, column: &'static str, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(values))
    }

    /// Orderings apply in the order they are added.
    pub fn order_by(mut self, column: &'static str, descending: bool) -> Self {
        self.order.push(Order { column, descending });
        self
    }

    fn filter(mut self, column: &'static str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter { column, op, value });
        self
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[Order] {
        &self.order
    }
}

/// Async row store.
///
/// Every write returns the rows it touched; an empty result means nothing
/// matched (or, for inserts, that the backend silently wrote nothing).
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: &'static str, row: Row) -> Result<Vec<Row>, StoreError>;

    /// Merge `changes` into every row matching `query`.
    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError>;

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError>;
}

#[async_trait::async_trait]
impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        (**self).select(query).await
    }

    async fn insert(&self, table: &'static str, row: Row) -> Result<Vec<Row>, StoreError> {
        (**self).insert(table, row).await
    }

    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        (**self).update(query, changes).await
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        (**self).delete(query).await
    }
}
