//! Combined article feed endpoint

use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use cshub_common::models::Article;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::services::articles::{
    calculate_pagination, combined_feed, page_slice, SourceStatus, ARTICLES_PER_PAGE,
    AVAILABLE_TAGS,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    /// Comma-separated tag list; unknown tags are ignored
    pub tags: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Article>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub status: SourceStatus,
}

impl ArticlesResponse {
    fn empty() -> Self {
        Self {
            articles: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 0,
            per_page: ARTICLES_PER_PAGE,
            status: SourceStatus::default(),
        }
    }
}

/// GET /api/articles?tags=a,b&page=n
///
/// No selected tags means no fetch: the page asks the visitor to pick
/// tags first.
pub async fn get_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let tags = selected_tags(query.tags.as_deref());
    if tags.is_empty() {
        return Ok(Json(ArticlesResponse::empty()));
    }

    let combined = combined_feed(&state.qiita, &state.zenn, &tags).await;

    let pagination = calculate_pagination(combined.articles.len(), query.page);
    let page_items = page_slice(&combined.articles, pagination).to_vec();

    Ok(Json(ArticlesResponse {
        total: combined.articles.len(),
        page: pagination.page,
        total_pages: pagination.total_pages,
        per_page: ARTICLES_PER_PAGE,
        articles: page_items,
        status: combined.status,
    }))
}

/// Parse the tag list, keeping only the tags the page offers
fn selected_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|tag| AVAILABLE_TAGS.contains(tag))
        .map(|tag| tag.to_string())
        .collect()
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/articles", get(get_articles))
}
