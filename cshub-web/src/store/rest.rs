//! REST implementation of the record store contract
//!
//! Speaks the hosted service's table REST dialect: filters become query
//! parameters (`user_id=eq.<uuid>`), mutations ask for the affected rows
//! back with `Prefer: return=representation`. Requests carry the session
//! bearer token when one is held so the service's row-level security
//! evaluates against the signed-in user; otherwise the anonymous key is
//! used. Concurrency control is entirely the store's job; this client
//! issues independent row-level calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cshub_common::{Error, Result};
use serde_json::Value;

use super::session::SessionHolder;
use super::{Direction, Filter, RecordStore, SelectQuery};

const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Arc<SessionHolder>,
}

impl RestStore {
    pub fn new(base_url: &str, anon_key: &str, session: Arc<SessionHolder>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn bearer(&self) -> String {
        self.session
            .access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone())
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Store(format!(
                "store rejected request ({}): {}",
                status.as_u16(),
                body
            )));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&body).map_err(|e| Error::Parse(format!("store response: {}", e)))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>> {
        let params = select_params(&query);
        let response = self
            .http
            .get(self.endpoint(table))
            .query(&params)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint(table))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer().await)
            .json(&row)
            .send()
            .await?;

        let mut rows = Self::read_rows(response).await?;
        if rows.is_empty() {
            return Err(Error::Store(format!("insert into {} returned no rows", table)));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: &str, patch: Value, filters: Vec<Filter>) -> Result<Vec<Value>> {
        let params = filter_params(&filters);
        let response = self
            .http
            .patch(self.endpoint(table))
            .query(&params)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer().await)
            .json(&patch)
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn delete(&self, table: &str, filters: Vec<Filter>) -> Result<Vec<Value>> {
        let params = filter_params(&filters);
        let response = self
            .http
            .delete(self.endpoint(table))
            .query(&params)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer().await)
            .send()
            .await?;

        Self::read_rows(response).await
    }
}

/// Render one filter as a query parameter pair
fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", value)),
        Filter::In(column, values) => (column.clone(), format!("in.({})", values.join(","))),
        Filter::Gte(column, value) => (column.clone(), format!("gte.{}", value)),
    }
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(filter_param).collect()
}

fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));

    if let Some((column, direction)) = &query.order {
        let suffix = match direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        params.push(("order".to_string(), format!("{}.{}", column, suffix)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_param() {
        let (key, value) = filter_param(&Filter::eq("book_id", "abc-123"));
        assert_eq!(key, "book_id");
        assert_eq!(value, "eq.abc-123");
    }

    #[test]
    fn test_in_filter_param() {
        let (key, value) = filter_param(&Filter::any_of("id", ["a", "b", "c"]));
        assert_eq!(key, "id");
        assert_eq!(value, "in.(a,b,c)");
    }

    #[test]
    fn test_gte_filter_param() {
        let (key, value) = filter_param(&Filter::gte("date", "2020-08-06"));
        assert_eq!(key, "date");
        assert_eq!(value, "gte.2020-08-06");
    }

    #[test]
    fn test_select_params_full_query() {
        let query = SelectQuery::new()
            .eq("book_id", "b1")
            .order_by("created_at", Direction::Descending)
            .limit(10);

        let params = select_params(&query);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("book_id".to_string(), "eq.b1".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_params_bare_query() {
        let params = select_params(&SelectQuery::new());
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
    }
}
