//! Auth endpoints
//!
//! Thin passthrough to the hosted auth service. Requires the hosted
//! record store to be configured; in-memory mode has no auth backend
//! and these endpoints report a configuration error.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use cshub_common::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::store::{AuthClient, AuthUser, Session};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    /// None while the confirmation email is pending
    pub session: Option<Session>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<AuthUser>,
}

fn auth_client(state: &AppState) -> Result<&Arc<AuthClient>, ApiError> {
    state.auth.as_ref().ok_or_else(|| {
        ApiError(Error::Config(
            "auth requires a hosted record store".to_string(),
        ))
    })
}

fn require_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError(Error::InvalidInput(
            "メールアドレスを入力してください".to_string(),
        )));
    }
    Ok(trimmed)
}

/// POST /api/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<SignUpResponse>, ApiError> {
    let auth = auth_client(&state)?;
    let email = require_email(&body.email)?;
    let session = auth.sign_up(email, &body.password).await?;
    Ok(Json(SignUpResponse { session }))
}

/// POST /api/auth/login
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
    let auth = auth_client(&state)?;
    let email = require_email(&body.email)?;
    let session = auth.sign_in_with_password(email, &body.password).await?;
    Ok(Json(session))
}

/// POST /api/auth/otp
///
/// Sends a one-time sign-in link; the email redirects to the site's
/// auth callback page.
pub async fn sign_in_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let auth = auth_client(&state)?;
    let email = require_email(&body.email)?;
    auth.sign_in_with_otp(email).await?;
    Ok(Json(StatusResponse {
        status: "sent".to_string(),
    }))
}

/// POST /api/auth/logout
pub async fn sign_out(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let auth = auth_client(&state)?;
    auth.sign_out().await?;
    Ok(Json(StatusResponse {
        status: "signed_out".to_string(),
    }))
}

/// GET /api/auth/session
///
/// Revalidates the held token against the auth service; a rejected
/// token clears the session and reports no user.
pub async fn current_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let auth = auth_client(&state)?;
    let user = auth.fetch_user().await?;
    Ok(Json(SessionResponse { user }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/login", post(sign_in))
        .route("/api/auth/otp", post(sign_in_otp))
        .route("/api/auth/logout", post(sign_out))
        .route("/api/auth/session", get(current_session))
}
