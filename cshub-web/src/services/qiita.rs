//! Tagged-article API adapter
//!
//! Queries the Qiita items endpoint for one tag at a time: 20 results,
//! newest first, token-authenticated. Responses are normalized into the
//! unified `Article` shape shared with the RSS adapter.

use std::time::Duration;

use cshub_common::models::{Article, ArticleAuthor, ArticleTag};
use cshub_common::time::parse_flexible_date;
use cshub_common::{Config, Error, Result};
use serde::Deserialize;
use tracing::debug;

const ITEMS_URL: &str = "https://qiita.com/api/v2/items";
const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const PER_PAGE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct QiitaItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub likes_count: i64,
    pub created_at: String,
    pub user: QiitaUser,
    #[serde(default)]
    pub tags: Vec<QiitaTag>,
}

#[derive(Debug, Deserialize)]
pub struct QiitaUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct QiitaTag {
    pub name: String,
}

pub struct QiitaClient {
    http: reqwest::Client,
    config: std::sync::Arc<Config>,
}

impl QiitaClient {
    pub fn new(config: std::sync::Arc<Config>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Fetch the newest articles carrying one tag.
    ///
    /// A missing access token is a typed configuration error; no request
    /// is sent.
    pub async fn articles_for_tag(&self, tag: &str) -> Result<Vec<Article>> {
        let token = self.config.qiita_token()?;

        debug!(tag = %tag, "fetching tagged articles");

        let response = self
            .http
            .get(ITEMS_URL)
            .query(&[
                ("query", format!("tag:{}", tag)),
                ("per_page", PER_PAGE.to_string()),
                ("sort", "created".to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<QiitaItem> = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("tagged-article response: {}", e)))?;

        items.iter().map(map_item).collect()
    }
}

/// Normalize one API item into the unified article shape
pub fn map_item(item: &QiitaItem) -> Result<Article> {
    let created_at = parse_flexible_date(&item.created_at)
        .ok_or_else(|| Error::Parse(format!("article timestamp: {}", item.created_at)))?;

    // Display name is optional on the API side; fall back to the login id
    let name = if item.user.name.trim().is_empty() {
        item.user.id.clone()
    } else {
        item.user.name.clone()
    };

    Ok(Article {
        id: item.id.clone(),
        title: item.title.clone(),
        url: item.url.clone(),
        likes_count: item.likes_count,
        created_at,
        user: ArticleAuthor {
            name,
            profile_image_url: item.user.profile_image_url.clone(),
        },
        tags: item
            .tags
            .iter()
            .map(|t| ArticleTag { name: t.name.clone() })
            .collect(),
    })
}
