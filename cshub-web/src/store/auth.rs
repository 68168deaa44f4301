//! Hosted auth service client
//!
//! Thin client for the record store's bundled auth endpoints: sign up,
//! password sign-in, OTP email sign-in, sign out, current-user lookup.
//! No auth logic lives here; the hosted service owns credentials,
//! sessions, and email delivery. Successful sign-ins are installed into
//! the shared `SessionHolder`.

use std::sync::Arc;
use std::time::Duration;

use cshub_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::session::SessionHolder;

const USER_AGENT: &str = concat!("cshub/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated identity as returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Active session: bearer token plus the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the hosted auth endpoints
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    callback_url: String,
    session: Arc<SessionHolder>,
}

impl AuthClient {
    pub fn new(
        base_url: &str,
        anon_key: &str,
        callback_url: String,
        session: Arc<SessionHolder>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            callback_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Register a new account. Returns the started session, or None when
    /// the service requires email confirmation before issuing one.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }

        match serde_json::from_str::<Session>(&body) {
            Ok(session) => {
                self.session.set(session.clone()).await;
                tracing::info!(user_id = %session.user.id, "signed up and signed in");
                Ok(Some(session))
            }
            // No access token in the response: confirmation email pending
            Err(_) => {
                tracing::info!(email = %email, "signed up, awaiting email confirmation");
                Ok(None)
            }
        }
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }

        let session: Session = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("token response: {}", e)))?;

        self.session.set(session.clone()).await;
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    /// Request a one-time sign-in link by email. The link redirects to
    /// the site's auth callback page.
    pub async fn sign_in_with_otp(&self, email: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("otp"))
            .query(&[("redirect_to", self.callback_url.as_str())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body));
        }

        tracing::info!(email = %email, "OTP sign-in link requested");
        Ok(())
    }

    /// Sign out. The local session is cleared even when the remote
    /// revocation fails; a dangling remote token expires on its own.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(token) = self.session.access_token().await {
            let result = self
                .http
                .post(self.endpoint("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&token)
                .send()
                .await;

            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = response.status().as_u16(), "remote sign-out rejected");
                }
                Err(e) => tracing::warn!(error = %e, "remote sign-out failed"),
                _ => {}
            }
        }

        self.session.clear().await;
        Ok(())
    }

    /// Validate the held token against the auth service and return the
    /// user it belongs to. A rejected token clears the local session.
    pub async fn fetch_user(&self) -> Result<Option<AuthUser>> {
        let Some(token) = self.session.access_token().await else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            tracing::info!("session token no longer valid, clearing session");
            self.session.clear().await;
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body));
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("user response: {}", e)))?;
        Ok(Some(user))
    }
}

/// Map an auth-service rejection to a store error with its message
fn rejection(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.error_description.or(e.msg).or(e.message))
        .unwrap_or_else(|| body.to_string());
    Error::Store(format!("auth rejected ({}): {}", status, detail))
}
