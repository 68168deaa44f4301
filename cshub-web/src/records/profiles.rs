//! User profile provisioning and lookup
//!
//! Profiles are created lazily: on first sign-in via the session watcher
//! task, or inline during review submission when still absent. The
//! default display name is the email local-part, falling back to a
//! `user_` prefix with the first 8 characters of the account id.

use std::collections::HashMap;
use std::sync::Arc;

use cshub_common::models::UserProfile;
use cshub_common::Result;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::tables;
use crate::store::{decode_row, decode_rows, AuthEvent, AuthUser, Filter, RecordStore, SelectQuery, SessionHolder};

/// Default display name derived from the account
pub fn default_username(user: &AuthUser) -> String {
    user.email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map(|local| local.to_string())
        .unwrap_or_else(|| format!("user_{}", &user.id.to_string()[..8]))
}

/// Look up one profile by identity
pub async fn profile_by_id(store: &dyn RecordStore, id: Uuid) -> Result<Option<UserProfile>> {
    let rows = store
        .select(tables::PROFILES, SelectQuery::new().eq("id", id))
        .await?;
    Ok(rows.into_iter().next().map(decode_row).transpose()?)
}

/// Batch-fetch profiles for a set of identities, keyed by id
pub async fn profiles_by_ids(
    store: &dyn RecordStore,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserProfile>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = store
        .select(
            tables::PROFILES,
            SelectQuery::new().filter(Filter::any_of("id", ids.iter())),
        )
        .await?;

    let profiles: Vec<UserProfile> = decode_rows(rows)?;
    Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
}

/// Fetch the user's profile, creating it with a default name when absent
pub async fn ensure_profile(store: &dyn RecordStore, user: &AuthUser) -> Result<UserProfile> {
    if let Some(existing) = profile_by_id(store, user.id).await? {
        return Ok(existing);
    }

    let username = default_username(user);
    debug!(user_id = %user.id, username = %username, "provisioning profile");

    let row = store
        .insert(
            tables::PROFILES,
            json!({ "id": user.id, "username": username }),
        )
        .await?;
    decode_row(row)
}

/// Watch the session holder and provision a profile on every sign-in.
///
/// This is the single subscription point for auth state changes;
/// components needing the current user read the holder instead of
/// subscribing themselves.
pub fn watch_sessions(store: Arc<dyn RecordStore>, session: Arc<SessionHolder>) {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AuthEvent::SignedIn(user)) => {
                    if let Err(e) = ensure_profile(store.as_ref(), &user).await {
                        warn!(user_id = %user.id, error = %e, "profile provisioning failed");
                    }
                }
                Ok(AuthEvent::SignedOut) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("session watcher stopped");
    });
}
