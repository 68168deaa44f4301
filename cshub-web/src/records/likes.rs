//! Like toggle and listing
//!
//! A like is a (user, book) pair; toggling flips its existence. The
//! derived like count changes by ±1 in the caller's view; on a store
//! error the caller re-fetches the authoritative list to resynchronize
//! its optimistic count.

use cshub_common::models::Like;
use cshub_common::Result;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{profiles, tables};
use crate::store::{decode_rows, Filter, RecordStore, SelectQuery, SessionHolder};

/// Flip the signed-in visitor's like on a book.
///
/// Returns the new liked state: true after an insert, false after a
/// delete. Unauthenticated callers are rejected before any store call.
///
/// This is a check-then-act sequence: two concurrent toggles from the
/// same user can both observe "absent" and insert twice. The store's
/// uniqueness constraint is the backstop; this layer does not guard it.
pub async fn toggle_like(
    store: &dyn RecordStore,
    session: &SessionHolder,
    book_id: Uuid,
) -> Result<bool> {
    let user = session.require_user().await?;

    let existing = store
        .select(
            tables::LIKES,
            SelectQuery::new()
                .eq("book_id", book_id)
                .eq("user_id", user.id),
        )
        .await?;

    if existing.is_empty() {
        store
            .insert(
                tables::LIKES,
                json!({ "book_id": book_id, "user_id": user.id }),
            )
            .await?;
        debug!(book_id = %book_id, user_id = %user.id, "liked");
        Ok(true)
    } else {
        store
            .delete(
                tables::LIKES,
                vec![Filter::eq("book_id", book_id), Filter::eq("user_id", user.id)],
            )
            .await?;
        debug!(book_id = %book_id, user_id = %user.id, "unliked");
        Ok(false)
    }
}

/// All likes on a book, enriched with the likers' profiles.
///
/// The profile join is best effort: when the batch lookup fails the
/// likes are still returned without profiles.
pub async fn likes_for_book(store: &dyn RecordStore, book_id: Uuid) -> Result<Vec<Like>> {
    let rows = store
        .select(tables::LIKES, SelectQuery::new().eq("book_id", book_id))
        .await?;
    let mut likes: Vec<Like> = decode_rows(rows)?;

    let mut user_ids: Vec<Uuid> = likes.iter().map(|l| l.user_id).collect();
    user_ids.sort();
    user_ids.dedup();

    match profiles::profiles_by_ids(store, &user_ids).await {
        Ok(profile_map) => {
            for like in &mut likes {
                like.profile = profile_map.get(&like.user_id).cloned();
            }
        }
        Err(e) => warn!(book_id = %book_id, error = %e, "like profile join failed"),
    }

    Ok(likes)
}
