//! cshub-web - Customer success knowledge hub web service
//!
//! Serves the hub's JSON API: news search, combined article feed,
//! trend charts, book catalog, likes, reviews, and auth passthrough.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cshub_common::config::{Config, Overrides};
use tracing::info;

use cshub_web::records::profiles;
use cshub_web::store::{MemoryStore, RecordStore, RestStore, SessionHolder};
use cshub_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "cshub-web", about = "Customer success knowledge hub web service")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host (overrides env and config file)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides env and config file)
    #[arg(long)]
    port: Option<u16>,

    /// Run against an in-memory record store (local development;
    /// auth endpoints are unavailable)
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting cshub-web v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Arc::new(Config::load(&Overrides {
        config_path: args.config.clone(),
        host: args.host.clone(),
        port: args.port,
    })?);

    let session = Arc::new(SessionHolder::new());

    let store: Arc<dyn RecordStore> = if args.memory_store {
        info!("using in-memory record store");
        Arc::new(MemoryStore::new())
    } else {
        let url = config.require_store_url()?;
        let anon_key = config.require_store_anon_key()?;
        info!(store_url = url, "using hosted record store");
        Arc::new(RestStore::new(url, anon_key, session.clone())?)
    };

    // Single subscription point for auth state changes: provisions the
    // visitor's profile on sign-in.
    profiles::watch_sessions(store.clone(), session.clone());

    let state = AppState::new(config.clone(), store, session)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("cshub-web listening on http://{}:{}", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
