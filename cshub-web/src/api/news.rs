//! News endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use cshub_common::models::NewsItem;
use serde::Serialize;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub status: String,
    pub results: Vec<NewsItem>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/news
///
/// Runs the fixed news search and returns the normalized items. A
/// missing credential or upstream rejection surfaces as a structured
/// error response, never a crash.
pub async fn get_news(State(state): State<AppState>) -> Result<Json<NewsResponse>, ApiError> {
    let results = state.news.fetch_news().await?;

    Ok(Json(NewsResponse {
        status: "success".to_string(),
        total: results.len(),
        results,
        timestamp: Utc::now(),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/news", get(get_news))
}
