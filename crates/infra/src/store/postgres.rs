//! Postgres-backed store.
//!
//! Rows travel as `jsonb`: reads project `to_jsonb(t)`, writes go through
//! `jsonb_populate_record` so every value is coerced to the column's own type.
//! Filter values are bound the same way, which keeps comparisons typed (dates
//! compare as dates, numbers as numbers).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | Other | N/A | `Backend` |

use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::instrument;

use careops_core::Row;

use super::{Filter, FilterOp, Query, Store, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create missing tables. Safe to run on every start.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }

    async fn fetch_rows(
        &self,
        operation: &'static str,
        sql: &str,
        binds: Vec<Value>,
    ) -> Result<Vec<Row>, StoreError> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(Json(value));
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        rows.into_iter()
            .map(|r| {
                let Json(value): Json<Value> = r
                    .try_get("row")
                    .map_err(|e| map_sqlx_error(operation, e))?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::Backend(format!(
                        "{operation}: expected a row object, got {other}"
                    ))),
                }
            })
            .collect()
    }
}

/// Quote an identifier. Names are compile-time constants, never caller input.
fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `$n` coerced to the type of `table.column`.
fn typed_param(table: &str, column: &str, param: usize) -> String {
    format!(
        "(jsonb_populate_record(NULL::{}, jsonb_build_object('{}', ${param}::jsonb))).{}",
        ident(table),
        column.replace('\'', "''"),
        ident(column)
    )
}

/// Render the WHERE clause, numbering parameters from `first_param`.
fn where_clause(query: &Query, first_param: usize, binds: &mut Vec<Value>) -> String {
    let table = query.table_name();
    let mut conditions = Vec::with_capacity(query.filters().len());

    for (offset, Filter { column, op, value }) in query.filters().iter().enumerate() {
        let param = first_param + offset;
        let col = format!("t.{}", ident(column));
        let condition = match op {
            FilterOp::Eq => format!("{col} = {}", typed_param(table, column, param)),
            FilterOp::Gte => format!("{col} >= {}", typed_param(table, column, param)),
            FilterOp::Lte => format!("{col} <= {}", typed_param(table, column, param)),
            FilterOp::In => format!(
                "{col} IN (SELECT (jsonb_populate_record(NULL::{tbl}, \
                 jsonb_build_object('{name}', v))).{c} \
                 FROM jsonb_array_elements(${param}::jsonb) AS v)",
                tbl = ident(table),
                name = column.replace('\'', "''"),
                c = ident(column),
            ),
        };
        conditions.push(condition);
        binds.push(value.clone());
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn order_clause(query: &Query) -> String {
    if query.ordering().is_empty() {
        return String::new();
    }
    let mut sql = String::from(" ORDER BY ");
    for (i, order) in query.ordering().iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let _ = write!(
            sql,
            "t.{} {}",
            ident(order.column),
            if order.descending { "DESC" } else { "ASC" }
        );
    }
    sql
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self), fields(table = query.table_name()), err)]
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut binds = Vec::new();
        let sql = format!(
            "SELECT to_jsonb(t) AS row FROM {} AS t{}{}",
            ident(query.table_name()),
            where_clause(query, 1, &mut binds),
            order_clause(query)
        );
        self.fetch_rows("select", &sql, binds).await
    }

    #[instrument(skip(self, row), fields(table = table), err)]
    async fn insert(&self, table: &'static str, row: Row) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "INSERT INTO {tbl} AS t SELECT * FROM jsonb_populate_record(NULL::{tbl}, $1::jsonb) \
             RETURNING to_jsonb(t) AS row",
            tbl = ident(table)
        );
        self.fetch_rows("insert", &sql, vec![Value::Object(row)]).await
    }

    #[instrument(skip(self, changes), fields(table = query.table_name()), err)]
    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        if changes.is_empty() {
            return self.select(query).await;
        }

        let table = query.table_name();
        let assignments = changes
            .keys()
            .map(|k| format!("{c} = p.{c}", c = ident(k)))
            .collect::<Vec<_>>()
            .join(", ");

        let mut binds = vec![Value::Object(changes)];
        let filters = where_clause(query, 2, &mut binds);
        let filters = if filters.is_empty() {
            String::new()
        } else {
            filters.replacen(" WHERE ", " AND ", 1)
        };

        let sql = format!(
            "UPDATE {tbl} AS t SET {assignments} \
             FROM jsonb_populate_record(NULL::{tbl}, $1::jsonb) AS p \
             WHERE TRUE{filters} RETURNING to_jsonb(t) AS row",
            tbl = ident(table)
        );
        self.fetch_rows("update", &sql, binds).await
    }

    #[instrument(skip(self), fields(table = query.table_name()), err)]
    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut binds = Vec::new();
        let sql = format!(
            "DELETE FROM {} AS t{} RETURNING to_jsonb(t) AS row",
            ident(query.table_name()),
            where_clause(query, 1, &mut binds)
        );
        self.fetch_rows("delete", &sql, binds).await
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
