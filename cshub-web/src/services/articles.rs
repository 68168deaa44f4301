//! Combined article feed
//!
//! Fans in the per-tag tagged-article queries and the RSS feed, then
//! deduplicates by canonical URL and sorts newest-first. A failing
//! source does not fail the feed: the surviving sources' results are
//! returned with a per-source failure flag for the UI to surface.

use cshub_common::models::Article;
use cshub_common::Result;
use serde::Serialize;
use tracing::warn;

use super::qiita::QiitaClient;
use super::zenn::ZennClient;

/// Tags the articles page offers for selection
pub const AVAILABLE_TAGS: [&str; 9] = [
    "カスタマーサクセス",
    "UI",
    "UX",
    "マーケティング",
    "SaaS",
    "分析",
    "データ分析",
    "ビジネス",
    "スタートアップ",
];

pub const ARTICLES_PER_PAGE: usize = 20;

/// Which sources failed while building the combined feed
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SourceStatus {
    pub qiita_failed: bool,
    pub zenn_failed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedArticles {
    pub articles: Vec<Article>,
    pub status: SourceStatus,
}

/// Fetch and combine all sources for the selected tags
pub async fn combined_feed(
    qiita: &QiitaClient,
    zenn: &ZennClient,
    tags: &[String],
) -> CombinedArticles {
    let mut qiita_batches = Vec::with_capacity(tags.len());
    for tag in tags {
        let batch = qiita.articles_for_tag(tag).await;
        if let Err(e) = &batch {
            warn!(tag = %tag, error = %e, "tagged-article fetch failed");
        }
        qiita_batches.push(batch);
    }

    let zenn_batch = zenn.articles_matching_any(tags).await;
    if let Err(e) = &zenn_batch {
        warn!(error = %e, "RSS feed fetch failed");
    }

    combine(qiita_batches, zenn_batch)
}

/// Merge per-source results into one deduplicated, sorted feed (pure).
///
/// Any failed batch sets its source's flag; no error escapes.
pub fn combine(
    qiita_batches: Vec<Result<Vec<Article>>>,
    zenn_batch: Result<Vec<Article>>,
) -> CombinedArticles {
    let mut status = SourceStatus::default();
    let mut all = Vec::new();

    for batch in qiita_batches {
        match batch {
            Ok(articles) => all.extend(articles),
            Err(_) => status.qiita_failed = true,
        }
    }

    match zenn_batch {
        Ok(articles) => all.extend(articles),
        Err(_) => status.zenn_failed = true,
    }

    CombinedArticles {
        articles: dedup_and_sort(all),
        status,
    }
}

/// Drop repeated URLs (first occurrence wins) and sort newest-first
pub fn dedup_and_sort(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<Article> = articles
        .into_iter()
        .filter(|article| seen.insert(article.url.clone()))
        .collect();

    unique.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    unique
}

/// Pagination metadata for the combined feed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Offset of the first item on the page
    pub offset: usize,
}

/// Calculate pagination metadata, clamping the page into valid bounds
pub fn calculate_pagination(total_results: usize, requested_page: usize) -> Pagination {
    let total_pages = total_results.div_ceil(ARTICLES_PER_PAGE);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * ARTICLES_PER_PAGE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

/// Slice one page out of the sorted feed
pub fn page_slice(articles: &[Article], pagination: Pagination) -> &[Article] {
    let start = pagination.offset.min(articles.len());
    let end = (start + ARTICLES_PER_PAGE).min(articles.len());
    &articles[start..end]
}
