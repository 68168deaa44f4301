//! In-memory implementation of the record store contract
//!
//! Applies the same filter semantics as the REST dialect over rows held
//! in process memory. Backs the test suite and the `--memory-store`
//! development mode, where the service runs without a hosted backend.
//!
//! Like the hosted store, inserts stamp a generated id and creation
//! timestamps when the caller does not supply them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cshub_common::{Error, Result};
use serde_json::Value;
use uuid::Uuid;

use super::{Direction, Filter, RecordStore, SelectQuery};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load reference rows, stamping ids and timestamps like `insert`
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().expect("memory store lock poisoned");
        let stored = tables.entry(table.to_string()).or_default();
        for mut row in rows {
            stamp_row(&mut row);
            stored.push(row);
        }
    }

    /// Snapshot of a table's rows, for test assertions
    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.lock().expect("memory store lock poisoned");
        tables.get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>> {
        let tables = self.tables.lock().expect("memory store lock poisoned");
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_fields(a, b, column);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value> {
        if !row.is_object() {
            return Err(Error::Store("insert payload must be an object".to_string()));
        }
        stamp_row(&mut row);

        let mut tables = self.tables.lock().expect("memory store lock poisoned");
        tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, patch: Value, filters: Vec<Filter>) -> Result<Vec<Value>> {
        let Some(patch_map) = patch.as_object() else {
            return Err(Error::Store("update payload must be an object".to_string()));
        };

        let mut tables = self.tables.lock().expect("memory store lock poisoned");
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches_all(row, &filters)) {
                if let Some(map) = row.as_object_mut() {
                    for (key, value) in patch_map {
                        map.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<Vec<Value>> {
        let mut tables = self.tables.lock().expect("memory store lock poisoned");
        let mut removed = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| {
                if matches_all(row, &filters) {
                    removed.push(row.clone());
                    false
                } else {
                    true
                }
            });
        }
        Ok(removed)
    }
}

fn stamp_row(row: &mut Value) {
    let now = Utc::now().to_rfc3339();
    if let Some(map) = row.as_object_mut() {
        map.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        map.entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        map.entry("updated_at").or_insert_with(|| Value::String(now));
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => field_as_string(row, column).as_deref() == Some(value),
        Filter::In(column, values) => field_as_string(row, column)
            .map(|field| values.iter().any(|v| v == &field))
            .unwrap_or(false),
        Filter::Gte(column, value) => field_as_string(row, column)
            .map(|field| field.as_str() >= value.as_str())
            .unwrap_or(false),
    }
}

fn field_as_string(row: &Value, column: &str) -> Option<String> {
    let field = row.get(column)?;
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn compare_fields(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => field_string(x).cmp(&field_string(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn field_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_stamps_id_and_timestamps() {
        let store = MemoryStore::new();
        let row = store
            .insert("books_likes", json!({"user_id": "u1", "book_id": "b1"}))
            .await
            .unwrap();

        assert!(row.get("id").and_then(Value::as_str).is_some());
        assert!(row.get("created_at").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn test_eq_filter_selects_matching_rows() {
        let store = MemoryStore::new();
        store.seed(
            "books_likes",
            vec![
                json!({"user_id": "u1", "book_id": "b1"}),
                json!({"user_id": "u2", "book_id": "b1"}),
                json!({"user_id": "u1", "book_id": "b2"}),
            ],
        );

        let rows = store
            .select("books_likes", SelectQuery::new().eq("book_id", "b1"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_in_filter() {
        let store = MemoryStore::new();
        store.seed(
            "users_profiles",
            vec![
                json!({"id": "u1", "username": "alice"}),
                json!({"id": "u2", "username": "bob"}),
                json!({"id": "u3", "username": "carol"}),
            ],
        );

        let rows = store
            .select(
                "users_profiles",
                SelectQuery::new().filter(Filter::any_of("id", ["u1", "u3"])),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_gte_filter_on_iso_dates() {
        let store = MemoryStore::new();
        store.seed(
            "saas_metrics",
            vec![
                json!({"company_name": "A", "metric_name": "arr", "date": "2019-01-01", "value": 1.0}),
                json!({"company_name": "A", "metric_name": "arr", "date": "2024-01-01", "value": 2.0}),
            ],
        );

        let rows = store
            .select("saas_metrics", SelectQuery::new().gte("date", "2020-01-01"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["date"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_order_and_limit() {
        let store = MemoryStore::new();
        store.seed(
            "books",
            vec![
                json!({"title": "b", "created_at": "2024-02-01T00:00:00Z"}),
                json!({"title": "c", "created_at": "2024-03-01T00:00:00Z"}),
                json!({"title": "a", "created_at": "2024-01-01T00:00:00Z"}),
            ],
        );

        let rows = store
            .select(
                "books",
                SelectQuery::new()
                    .order_by("created_at", Direction::Descending)
                    .limit(2),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "c");
        assert_eq!(rows[1]["title"], "b");
    }

    #[tokio::test]
    async fn test_update_matches_zero_rows_returns_empty() {
        let store = MemoryStore::new();
        store.seed("books_reviews", vec![json!({"id": "r1", "user_id": "u1"})]);

        let updated = store
            .update(
                "books_reviews",
                json!({"content": "new"}),
                vec![Filter::eq("id", "r1"), Filter::eq("user_id", "intruder")],
            )
            .await
            .unwrap();
        assert!(updated.is_empty());

        // Row untouched
        let rows = store.rows("books_reviews");
        assert!(rows[0].get("content").is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let store = MemoryStore::new();
        store.seed(
            "books_likes",
            vec![
                json!({"user_id": "u1", "book_id": "b1"}),
                json!({"user_id": "u2", "book_id": "b1"}),
            ],
        );

        let removed = store
            .delete("books_likes", vec![Filter::eq("user_id", "u1")])
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(store.rows("books_likes").len(), 1);
    }
}
