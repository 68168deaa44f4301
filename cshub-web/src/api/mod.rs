//! HTTP API surface
//!
//! One module per page-facing endpoint group, each exporting a route
//! builder merged in `build_router`. Handler failures map onto HTTP
//! status codes here; nothing propagates as a crash.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cshub_common::Error;
use serde_json::json;

pub mod articles;
pub mod auth;
pub mod books;
pub mod health;
pub mod news;
pub mod trends;

/// Wrapper mapping the domain error taxonomy onto HTTP responses
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::AuthRequired => (StatusCode::UNAUTHORIZED, "ログインが必要です".to_string()),
            Error::NotFoundOrForbidden(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Upstream { status, .. } => (
                StatusCode::BAD_GATEWAY,
                format!("upstream API returned {}", status),
            ),
            Error::Network(_) => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            Error::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Parse(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
