//! Backend record store client
//!
//! The hosted database-as-a-service is consumed as a generic record
//! store: table-level select/insert/update/delete with equality filters
//! and ordering, nothing else. The `RecordStore` trait is the seam the
//! interaction layer is written against; the production implementation
//! talks REST to the hosted service, and the in-memory implementation
//! backs tests and local development.

use async_trait::async_trait;
use cshub_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod auth;
pub mod memory;
pub mod rest;
pub mod session;

pub use auth::{AuthClient, AuthUser, Session};
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use session::{AuthEvent, SessionHolder};

/// Row filter: the only predicates the store contract exposes
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value
    Eq(String, String),
    /// Column is one of the listed values
    In(String, Vec<String>),
    /// Column is greater than or equal to value. Date columns are ISO
    /// strings, so lexicographic comparison matches the store's ordering.
    Gte(String, String),
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Filter::Eq(column.to_string(), value.to_string())
    }

    pub fn any_of(column: &str, values: impl IntoIterator<Item = impl ToString>) -> Self {
        Filter::In(
            column.to_string(),
            values.into_iter().map(|v| v.to_string()).collect(),
        )
    }

    pub fn gte(column: &str, value: impl ToString) -> Self {
        Filter::Gte(column.to_string(), value.to_string())
    }
}

/// Sort direction for `SelectQuery::order_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Query shape for `RecordStore::select`
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::gte(column, value))
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Table-level access to the backend record store
///
/// Mutations return the affected rows; an update or delete matching zero
/// rows returns an empty vector rather than an error, and the caller
/// decides what that means (typically "not found or not permitted").
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>>;
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;
    async fn update(&self, table: &str, patch: Value, filters: Vec<Filter>) -> Result<Vec<Value>>;
    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<Vec<Value>>;
}

/// Decode store rows into a typed record
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}

/// Decode a single store row into a typed record
pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| Error::Parse(format!("store row: {}", e)))
}
