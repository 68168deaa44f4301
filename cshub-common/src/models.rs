//! Normalized record models
//!
//! Rows of the backend record store plus the local shapes the content
//! fetch adapters map external API responses into.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile row (`users_profiles`)
///
/// Created lazily on first sign-in, or inline during review submission
/// when still absent. Never deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Like row (`books_likes`): at most one per (user, book)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Denormalized join performed in the interaction layer, not the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Review row (`books_reviews`): free-text commentary owned by its author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Denormalized join; None when enrichment failed (non-fatal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Book reference row (`books`), read-only from this layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub amazon_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trend metric row (`saas_metrics`), read-only time series data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendMetric {
    pub company_name: String,
    pub metric_name: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Normalized news item produced by the news search adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable id within one response (result index)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display date in Japanese long form
    pub date: String,
    pub image_url: String,
    pub url: String,
    /// Human-readable source label derived from the URL's domain
    pub source: String,
}

/// Unified article shape across the tagged-article API and the RSS feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub user: ArticleAuthor,
    pub tags: Vec<ArticleTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleAuthor {
    pub name: String,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleTag {
    pub name: String,
}
