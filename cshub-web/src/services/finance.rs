//! Finance data adapter
//!
//! Looks up quarterly earnings for a fixed list of five listed SaaS
//! companies and annualizes the quarterly revenue (× 4) as an ARR
//! approximation. One company failing degrades to an empty series for
//! that company. Results are cached in process memory for one hour.

use std::time::{Duration, Instant};

use cshub_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// The tracked companies: ticker, legal name, flagship product, chart color
pub struct CompanyInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub product: &'static str,
    pub color: &'static str,
}

pub const COMPANIES: [CompanyInfo; 5] = [
    CompanyInfo {
        symbol: "4443.T",
        name: "Sansan株式会社",
        product: "Sansan",
        color: "#36A2EB",
    },
    CompanyInfo {
        symbol: "4478.T",
        name: "フリー株式会社",
        product: "freee",
        color: "#FF6384",
    },
    CompanyInfo {
        symbol: "4484.T",
        name: "ランドコンピュータ株式会社",
        product: "LANDMark",
        color: "#4BC0C0",
    },
    CompanyInfo {
        symbol: "3966.T",
        name: "株式会社ユーザベース",
        product: "SPEEDA",
        color: "#FFCD56",
    },
    CompanyInfo {
        symbol: "4489.T",
        name: "株式会社プレイド",
        product: "KARTE",
        color: "#FF9F40",
    },
];

/// One quarter's revenue with its annualized run rate
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuarterlyPoint {
    pub date: String,
    pub revenue: f64,
    pub arr: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyFinancials {
    pub name: String,
    pub product: String,
    pub color: String,
    pub financials: Vec<QuarterlyPoint>,
}

/// Annualized run rate approximated from one quarter's revenue
pub fn annualized_run_rate(quarterly_revenue: f64) -> f64 {
    quarterly_revenue * 4.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Vec<QuoteSummaryResult>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    earnings: Option<Earnings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Earnings {
    #[serde(default)]
    financials_chart: Option<FinancialsChart>,
}

#[derive(Debug, Deserialize)]
struct FinancialsChart {
    #[serde(default)]
    quarterly: Vec<QuarterlyEarning>,
}

#[derive(Debug, Deserialize)]
struct QuarterlyEarning {
    date: String,
    #[serde(default)]
    revenue: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: f64,
}

struct CachedReport {
    fetched_at: Instant,
    data: Vec<CompanyFinancials>,
}

impl CachedReport {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

pub struct FinanceClient {
    http: reqwest::Client,
    cache: RwLock<Option<CachedReport>>,
}

impl FinanceClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            cache: RwLock::new(None),
        })
    }

    /// Financials for every tracked company, served from the one-hour
    /// cache when fresh.
    pub async fn company_financials(&self) -> Vec<CompanyFinancials> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh(CACHE_TTL) {
                    debug!("serving finance data from cache");
                    return cached.data.clone();
                }
            }
        }

        let data = self.fetch_all().await;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedReport {
            fetched_at: Instant::now(),
            data: data.clone(),
        });
        info!(companies = data.len(), "refreshed finance cache");

        data
    }

    /// Fetch all companies; a failing lookup degrades to an empty series
    async fn fetch_all(&self) -> Vec<CompanyFinancials> {
        let mut all = Vec::with_capacity(COMPANIES.len());

        for company in &COMPANIES {
            let financials = match self.quarterly_series(company.symbol).await {
                Ok(points) => points,
                Err(e) => {
                    warn!(symbol = company.symbol, error = %e, "earnings lookup failed");
                    Vec::new()
                }
            };

            all.push(CompanyFinancials {
                name: company.name.to_string(),
                product: company.product.to_string(),
                color: company.color.to_string(),
                financials,
            });
        }

        all
    }

    async fn quarterly_series(&self, symbol: &str) -> Result<Vec<QuarterlyPoint>> {
        let url = format!("{}/{}", QUOTE_SUMMARY_URL, symbol);
        let response = self
            .http
            .get(&url)
            .query(&[("modules", "earnings")])
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

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("earnings response: {}", e)))?;

        Ok(extract_quarterly_points(envelope))
    }
}

/// Pull the quarterly revenue series out of the provider's envelope
fn extract_quarterly_points(envelope: QuoteSummaryEnvelope) -> Vec<QuarterlyPoint> {
    envelope
        .quote_summary
        .result
        .into_iter()
        .filter_map(|r| r.earnings)
        .filter_map(|e| e.financials_chart)
        .flat_map(|chart| chart.quarterly)
        .filter_map(|quarter| {
            let revenue = quarter.revenue?.raw;
            Some(QuarterlyPoint {
                date: quarter.date,
                revenue,
                arr: annualized_run_rate(revenue),
            })
        })
        .collect()
}
