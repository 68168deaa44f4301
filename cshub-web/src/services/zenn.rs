//! RSS feed adapter
//!
//! Fetches the Zenn top feed, filters items by keyword client-side
//! (the feed has no query parameters), and caps the result at 10. The
//! feed carries no like counts or tags, so those normalize to zero and
//! a single source tag; the author is recovered from the article URL.

use std::time::Duration;

use cshub_common::models::{Article, ArticleAuthor, ArticleTag};
use cshub_common::time::parse_flexible_date;
use cshub_common::{Error, Result};
use serde::Deserialize;
use tracing::debug;

const FEED_URL: &str = "https://zenn.dev/feed";
const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ARTICLES: usize = 10;

const SOURCE_TAG: &str = "Zenn";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub guid: Option<Guid>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub struct Guid {
    #[serde(rename = "$text")]
    pub value: String,
}

pub struct ZennClient {
    http: reqwest::Client,
}

impl ZennClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch the feed and keep items matching any of the keywords
    pub async fn articles_matching_any(&self, keywords: &[String]) -> Result<Vec<Article>> {
        debug!(keywords = ?keywords, "fetching RSS feed");

        let response = self.http.get(FEED_URL).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let xml = response.text().await?;
        let feed = parse_feed(&xml)?;
        Ok(filter_and_map(feed, keywords))
    }
}

/// Parse the raw RSS XML into its items
pub fn parse_feed(xml: &str) -> Result<Vec<RssItem>> {
    let rss: Rss =
        quick_xml::de::from_str(xml).map_err(|e| Error::Parse(format!("RSS feed: {}", e)))?;
    Ok(rss.channel.items)
}

/// Keyword-filter feed items and normalize the survivors (pure)
pub fn filter_and_map(items: Vec<RssItem>, keywords: &[String]) -> Vec<Article> {
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    items
        .into_iter()
        .filter(|item| {
            let haystack = format!("{} {}", item.title, item.description).to_lowercase();
            lowered.iter().any(|k| haystack.contains(k))
        })
        .take(MAX_ARTICLES)
        .filter_map(|item| map_item(&item))
        .collect()
}

/// Normalize one feed item; items with an unparsable date are dropped
fn map_item(item: &RssItem) -> Option<Article> {
    let created_at = parse_flexible_date(&item.pub_date)?;
    let username = author_from_link(&item.link);

    Some(Article {
        id: item
            .guid
            .as_ref()
            .map(|g| g.value.clone())
            .unwrap_or_else(|| item.link.clone()),
        title: item.title.clone(),
        url: item.link.clone(),
        // The feed exposes no like counts
        likes_count: 0,
        created_at,
        user: ArticleAuthor {
            profile_image_url: format!("https://zenn.dev/{}/avatar", username),
            name: username,
        },
        tags: vec![ArticleTag {
            name: SOURCE_TAG.to_string(),
        }],
    })
}

/// The author login is the first path segment of the article URL
fn author_from_link(link: &str) -> String {
    link.split('/')
        .nth(3)
        .filter(|segment| !segment.is_empty())
        .unwrap_or("zenn")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Zennのトレンド</title>
    <link>https://zenn.dev</link>
    <description>新着記事</description>
    <item>
      <title>カスタマーサクセスのためのデータ基盤</title>
      <description>SaaSの解約率を下げる分析基盤の話</description>
      <link>https://zenn.dev/hanako/articles/cs-data-platform</link>
      <guid isPermaLink="true">https://zenn.dev/hanako/articles/cs-data-platform</guid>
      <pubDate>Wed, 30 Jul 2025 10:00:00 +0900</pubDate>
    </item>
    <item>
      <title>Rustでゲームを作る</title>
      <description>週末プロジェクトの記録</description>
      <link>https://zenn.dev/taro/articles/rust-game</link>
      <guid isPermaLink="true">https://zenn.dev/taro/articles/rust-game</guid>
      <pubDate>Tue, 29 Jul 2025 09:00:00 +0900</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let items = parse_feed(FEED_FIXTURE).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "カスタマーサクセスのためのデータ基盤");
        assert_eq!(
            items[0].guid.as_ref().unwrap().value,
            "https://zenn.dev/hanako/articles/cs-data-platform"
        );
    }

    #[test]
    fn test_keyword_filter_matches_title_or_description() {
        let items = parse_feed(FEED_FIXTURE).unwrap();
        let articles = filter_and_map(items, &["カスタマーサクセス".to_string()]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].user.name, "hanako");
        assert_eq!(articles[0].likes_count, 0);
        assert_eq!(articles[0].tags[0].name, SOURCE_TAG);
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive() {
        let items = parse_feed(FEED_FIXTURE).unwrap();
        let articles = filter_and_map(items, &["RUST".to_string()]);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].user.name, "taro");
    }

    #[test]
    fn test_result_capped_at_ten() {
        let many: Vec<RssItem> = (0..25)
            .map(|i| RssItem {
                title: format!("SaaS記事{}", i),
                description: String::new(),
                link: format!("https://zenn.dev/u{}/articles/a{}", i, i),
                guid: None,
                pub_date: "Wed, 30 Jul 2025 10:00:00 +0900".to_string(),
            })
            .collect();

        let articles = filter_and_map(many, &["saas".to_string()]);
        assert_eq!(articles.len(), MAX_ARTICLES);
    }

    #[test]
    fn test_avatar_url_derived_from_author() {
        let items = parse_feed(FEED_FIXTURE).unwrap();
        let articles = filter_and_map(items, &["カスタマーサクセス".to_string()]);
        assert_eq!(
            articles[0].user.profile_image_url,
            "https://zenn.dev/hanako/avatar"
        );
    }
}
