//! News search adapter
//!
//! Wraps the search provider's POST endpoint with a fixed query shape:
//! customer-success keywords, advanced depth, an allow list of news
//! domains, and a 30-result cap. Results are normalized into `NewsItem`
//! records with a Japanese display date, a placeholder image when the
//! source supplies none, and a human-readable source label derived from
//! the URL's domain.

use std::time::Duration;

use chrono::Utc;
use cshub_common::models::NewsItem;
use cshub_common::time::{format_ja_date, parse_flexible_date};
use cshub_common::{Config, Error, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

const SEARCH_URL: &str = "https://api.tavily.com/search";
const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: u32 = 30;

const SEARCH_QUERY: &str = "カスタマーサクセス customer success 最新ニュース";

const NEWS_DOMAINS: [&str; 10] = [
    "nikkei.com",
    "reuters.com",
    "bloomberg.co.jp",
    "forbes.jp",
    "businessinsider.jp",
    "zdnet.com",
    "itmedia.co.jp",
    "techcrunch.com",
    "cnet.com",
    "ascii.jp",
];

const EXCLUDED_DOMAINS: [&str; 3] = ["qiita.com", "zenn.dev", "note.com"];

/// Placeholder artwork rotated through items without a source image
const PLACEHOLDER_IMAGES: [&str; 5] = [
    "/A_01_office_presentation1.png",
    "/A_01office_seane004.png",
    "/A_01office_seane003.png",
    "/E_04_childcare007_3d_front.png",
    "/A_01_office_Discussion3.png",
];

/// Domain to source-label table, checked exact-first then by substring
const DOMAIN_SOURCES: [(&str, &str); 10] = [
    ("nikkei.com", "日本経済新聞"),
    ("reuters.com", "ロイター"),
    ("bloomberg.co.jp", "Bloomberg"),
    ("forbes.jp", "Forbes JAPAN"),
    ("businessinsider.jp", "Business Insider Japan"),
    ("zdnet.com", "ZDNet Japan"),
    ("itmedia.co.jp", "ITmedia"),
    ("techcrunch.com", "TechCrunch"),
    ("cnet.com", "CNET Japan"),
    ("ascii.jp", "ASCII.jp"),
];

const UNKNOWN_SOURCE: &str = "情報源不明";
const UNTITLED: &str = "無題";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub struct NewsClient {
    http: reqwest::Client,
    config: std::sync::Arc<Config>,
}

impl NewsClient {
    pub fn new(config: std::sync::Arc<Config>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Run the fixed news search and normalize the results.
    ///
    /// A missing or malformed API key is a typed configuration error and
    /// no request is sent.
    pub async fn fetch_news(&self) -> Result<Vec<NewsItem>> {
        let api_key = self.config.tavily_key()?;

        let body = json!({
            "query": SEARCH_QUERY,
            "search_depth": "advanced",
            "include_domains": NEWS_DOMAINS,
            "exclude_domains": EXCLUDED_DOMAINS,
            "language": "ja",
            "max_results": MAX_RESULTS,
            "include_answer": false,
            "include_images": true,
            "include_raw_content": false,
            "filter_by_source_type": ["news"],
        });

        debug!(query = SEARCH_QUERY, "running news search");

        let response = self
            .http
            .post(SEARCH_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "news search rejected");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("news search response: {}", e)))?;

        Ok(raw
            .results
            .iter()
            .enumerate()
            .map(|(index, result)| map_result(index, result))
            .collect())
    }
}

/// Normalize one raw search result into a `NewsItem`
pub fn map_result(index: usize, result: &SearchResult) -> NewsItem {
    let domain = hostname(&result.url).unwrap_or_default();

    let raw_title = if result.title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        result.title.clone()
    };
    let title = sanitize_text(&raw_title, &domain);
    let title = if title.is_empty() { UNTITLED.to_string() } else { title };

    let raw_description = result
        .content
        .clone()
        .or_else(|| result.snippet.clone())
        .unwrap_or_else(|| raw_title.clone());
    let description = sanitize_text(&raw_description, &domain);

    let date = result
        .published_date
        .as_deref()
        .and_then(parse_flexible_date)
        .unwrap_or_else(Utc::now);

    let image_url = result
        .image_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGES[index % PLACEHOLDER_IMAGES.len()].to_string());

    NewsItem {
        id: index.to_string(),
        title,
        description,
        date: format_ja_date(&date),
        image_url,
        url: result.url.clone(),
        source: source_label(&result.url),
    }
}

/// Derive the human-readable source label from a URL.
///
/// Exact domain match first, then substring match (covers subdomains),
/// then the raw hostname; unparsable URLs map to the unknown label.
pub fn source_label(url: &str) -> String {
    let Some(domain) = hostname(url) else {
        return UNKNOWN_SOURCE.to_string();
    };

    for (known, label) in DOMAIN_SOURCES {
        if domain == known {
            return label.to_string();
        }
    }
    for (known, label) in DOMAIN_SOURCES {
        if domain.contains(known) {
            return label.to_string();
        }
    }

    domain
}

fn hostname(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Strip the mojibake classes seen in upstream article text: control
/// characters, Unicode specials, and (for the one feed that mixes
/// encodings) stray Latin-1 bytes. Whitespace is collapsed.
pub fn sanitize_text(text: &str, domain: &str) -> String {
    let mut cleaned: String = if domain.contains("itmedia.co.jp") {
        text.chars()
            .filter(|&c| !('\u{0080}'..='\u{00ff}').contains(&c) && c != '\u{fffd}')
            .filter(|&c| is_allowed_ja(c))
            .collect()
    } else {
        text.to_string()
    };

    cleaned = cleaned
        .chars()
        .filter(|&c| {
            !c.is_control() && !('\u{007f}'..='\u{009f}').contains(&c) && !('\u{fff0}'..='\u{ffff}').contains(&c)
        })
        .map(|c| if c == '\u{3000}' { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Characters the strict sanitizer keeps: printable ASCII plus the
/// Japanese writing-system blocks
fn is_allowed_ja(c: char) -> bool {
    matches!(c,
        '\u{0020}'..='\u{007e}'
        | '\u{3000}'..='\u{303f}'
        | '\u{3040}'..='\u{309f}'
        | '\u{30a0}'..='\u{30ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}'
        | '\u{ff66}'..='\u{ff9f}'
    )
}
