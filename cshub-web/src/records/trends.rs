//! Trend metric queries and grouping
//!
//! Reads the last five years of `saas_metrics` rows and reshapes them
//! for the trend charts: sorted unique company and metric lists, and a
//! company → metric → time series map with display dates.

use std::collections::BTreeMap;

use chrono::{Months, Utc};
use cshub_common::models::TrendMetric;
use cshub_common::time::format_year_month;
use cshub_common::Result;
use serde::Serialize;

use super::tables;
use crate::store::{decode_rows, Direction, RecordStore, SelectQuery};

const WINDOW_MONTHS: u32 = 60;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricRef {
    pub id: String,
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: chrono::NaiveDate,
    pub formatted_date: String,
    pub value: f64,
    pub unit: String,
}

/// Grouped trend data as consumed by the charts page
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub companies: Vec<CompanyRef>,
    pub metrics: Vec<MetricRef>,
    pub trends: BTreeMap<String, BTreeMap<String, Vec<TrendPoint>>>,
}

/// Display unit for a metric name
fn unit_for(metric_name: &str) -> &'static str {
    match metric_name.to_lowercase().as_str() {
        "arr" => "億円",
        "nrr" | "churn_rate" => "%",
        _ => "",
    }
}

/// Build the trend report from the store's metric rows
pub async fn trend_report(store: &dyn RecordStore) -> Result<TrendReport> {
    let window_start = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or_else(|| Utc::now().date_naive());

    let rows = store
        .select(
            tables::METRICS,
            SelectQuery::new()
                .gte("date", window_start)
                .order_by("date", Direction::Ascending),
        )
        .await?;
    let metrics: Vec<TrendMetric> = decode_rows(rows)?;

    Ok(group_metrics(metrics))
}

/// Reshape metric rows into the report structure (pure)
pub fn group_metrics(rows: Vec<TrendMetric>) -> TrendReport {
    let mut company_names: Vec<String> = rows.iter().map(|r| r.company_name.clone()).collect();
    company_names.sort();
    company_names.dedup();

    let mut metric_names: Vec<String> = rows.iter().map(|r| r.metric_name.clone()).collect();
    metric_names.sort();
    metric_names.dedup();

    let companies = company_names
        .iter()
        .map(|name| CompanyRef {
            id: name.clone(),
            name: name.clone(),
        })
        .collect();

    let metrics = metric_names
        .iter()
        .map(|name| MetricRef {
            id: name.clone(),
            name: name.clone(),
            unit: unit_for(name).to_string(),
        })
        .collect();

    let mut trends: BTreeMap<String, BTreeMap<String, Vec<TrendPoint>>> = BTreeMap::new();
    for row in rows {
        let unit = unit_for(&row.metric_name).to_string();
        trends
            .entry(row.company_name)
            .or_default()
            .entry(row.metric_name)
            .or_default()
            .push(TrendPoint {
                formatted_date: format_year_month(&row.date),
                date: row.date,
                value: row.value,
                unit,
            });
    }

    TrendReport {
        companies,
        metrics,
        trends,
    }
}
