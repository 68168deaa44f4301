//! cshub-web library - Customer success knowledge hub web service
//!
//! JSON API behind the hub's pages: news search, combined article feed,
//! trend charts, and the book catalog with likes and reviews against
//! the hosted record store.

use std::sync::Arc;

use axum::Router;
use cshub_common::{Config, Result};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod records;
pub mod services;
pub mod store;

use services::finance::FinanceClient;
use services::news::NewsClient;
use services::qiita::QiitaClient;
use services::zenn::ZennClient;
use store::{AuthClient, RecordStore, SessionHolder};

/// Application state shared across HTTP handlers
///
/// The record store client is constructed once in `main` and injected
/// here; nothing holds it as a global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub session: Arc<SessionHolder>,
    /// None when no hosted store is configured (in-memory mode)
    pub auth: Option<Arc<AuthClient>>,
    pub news: Arc<NewsClient>,
    pub qiita: Arc<QiitaClient>,
    pub zenn: Arc<ZennClient>,
    pub finance: Arc<FinanceClient>,
}

impl AppState {
    /// Create application state, building the content adapters and the
    /// auth client (when a hosted store is configured).
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn RecordStore>,
        session: Arc<SessionHolder>,
    ) -> Result<Self> {
        let auth = match (&config.store_url, &config.store_anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(AuthClient::new(
                url,
                key,
                config.auth_callback_url(),
                session.clone(),
            )?)),
            _ => None,
        };

        Ok(Self {
            news: Arc::new(NewsClient::new(config.clone())?),
            qiita: Arc::new(QiitaClient::new(config.clone())?),
            zenn: Arc::new(ZennClient::new()?),
            finance: Arc::new(FinanceClient::new()?),
            config,
            store,
            session,
            auth,
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::routes())
        .merge(api::news::routes())
        .merge(api::articles::routes())
        .merge(api::trends::routes())
        .merge(api::books::routes())
        .merge(api::auth::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
