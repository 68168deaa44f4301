//! Trend chart endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::ApiError;
use crate::records::trends::{self, TrendReport};
use crate::services::finance::CompanyFinancials;
use crate::AppState;

/// GET /api/trends
///
/// Store-backed metric time series for the trend charts.
pub async fn get_trends(State(state): State<AppState>) -> Result<Json<TrendReport>, ApiError> {
    let report = trends::trend_report(state.store.as_ref()).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct ArrResponse {
    pub companies: Vec<CompanyFinancials>,
}

/// GET /api/trends/arr
///
/// Annualized-run-rate approximation per tracked company, served from
/// the hourly cache. Companies whose lookup failed carry an empty
/// series rather than failing the response.
pub async fn get_arr(State(state): State<AppState>) -> Json<ArrResponse> {
    let companies = state.finance.company_financials().await;
    Json(ArrResponse { companies })
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/trends", get(get_trends))
        .route("/api/trends/arr", get(get_arr))
}
