//! Review lifecycle: submit, list, edit, delete
//!
//! Mutations are permitted only to the owning identity, enforced by
//! including the owner id as a filter on the store call; an update or
//! delete matching zero rows is reported as "not found or not
//! permitted" without distinguishing the two. Profile enrichment is
//! tolerated to fail: a review without a resolvable profile is still
//! returned and shown with a fallback name.

use chrono::Utc;
use cshub_common::models::Review;
use cshub_common::{Error, Result};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::{profiles, tables};
use crate::store::{decode_row, decode_rows, Direction, Filter, RecordStore, SelectQuery, SessionHolder};

/// Submit a review on a book.
///
/// Empty or whitespace-only content is rejected before any store call.
/// The returned review carries the author's profile, provisioning it
/// inline when the row is still missing.
pub async fn add_review(
    store: &dyn RecordStore,
    session: &SessionHolder,
    book_id: Uuid,
    content: &str,
) -> Result<Review> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "レビュー内容を入力してください".to_string(),
        ));
    }

    let user = session.require_user().await?;

    let row = store
        .insert(
            tables::REVIEWS,
            json!({
                "book_id": book_id,
                "user_id": user.id,
                "content": trimmed,
            }),
        )
        .await?;
    let mut review: Review = decode_row(row)?;

    // Enrichment failure is non-fatal; the review stands on its own
    match profiles::ensure_profile(store, &user).await {
        Ok(profile) => review.profile = Some(profile),
        Err(e) => warn!(review_id = %review.id, error = %e, "profile enrichment failed"),
    }

    Ok(review)
}

/// All reviews on a book, newest first, with the authors' profiles
/// joined in memory (two-step fetch-then-join; no store-side join).
pub async fn reviews_for_book(store: &dyn RecordStore, book_id: Uuid) -> Result<Vec<Review>> {
    let rows = store
        .select(
            tables::REVIEWS,
            SelectQuery::new()
                .eq("book_id", book_id)
                .order_by("created_at", Direction::Descending),
        )
        .await?;
    let mut reviews: Vec<Review> = decode_rows(rows)?;

    if reviews.is_empty() {
        return Ok(reviews);
    }

    let mut user_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
    user_ids.sort();
    user_ids.dedup();

    match profiles::profiles_by_ids(store, &user_ids).await {
        Ok(profile_map) => {
            for review in &mut reviews {
                review.profile = profile_map.get(&review.user_id).cloned();
            }
        }
        Err(e) => warn!(book_id = %book_id, error = %e, "review profile join failed"),
    }

    Ok(reviews)
}

/// Edit a review's content. The owner id rides along as an update
/// filter, so a non-owner's call matches zero rows.
pub async fn update_review(
    store: &dyn RecordStore,
    session: &SessionHolder,
    review_id: Uuid,
    content: &str,
) -> Result<Review> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "レビュー内容を入力してください".to_string(),
        ));
    }

    let user = session.require_user().await?;

    let updated = store
        .update(
            tables::REVIEWS,
            json!({
                "content": trimmed,
                "updated_at": Utc::now(),
            }),
            vec![Filter::eq("id", review_id), Filter::eq("user_id", user.id)],
        )
        .await?;

    let row = updated.into_iter().next().ok_or_else(|| {
        Error::NotFoundOrForbidden(format!("review {}", review_id))
    })?;
    let mut review: Review = decode_row(row)?;

    match profiles::profile_by_id(store, user.id).await {
        Ok(profile) => review.profile = profile,
        Err(e) => warn!(review_id = %review.id, error = %e, "profile enrichment failed"),
    }

    Ok(review)
}

/// Delete a review. An explicit existence+ownership read runs first: a
/// filtered delete matching zero rows would otherwise report success
/// without signaling anything.
pub async fn delete_review(
    store: &dyn RecordStore,
    session: &SessionHolder,
    review_id: Uuid,
) -> Result<()> {
    let user = session.require_user().await?;

    let existing = store
        .select(
            tables::REVIEWS,
            SelectQuery::new().eq("id", review_id).eq("user_id", user.id),
        )
        .await?;
    if existing.is_empty() {
        return Err(Error::NotFoundOrForbidden(format!("review {}", review_id)));
    }

    store
        .delete(
            tables::REVIEWS,
            vec![Filter::eq("id", review_id), Filter::eq("user_id", user.id)],
        )
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AuthUser, MemoryStore, Session, SessionHolder};

    async fn signed_in_session(email: &str) -> (SessionHolder, AuthUser) {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        let holder = SessionHolder::new();
        holder
            .set(Session {
                access_token: "token".to_string(),
                refresh_token: None,
                expires_in: None,
                user: user.clone(),
            })
            .await;
        (holder, user)
    }

    #[tokio::test]
    async fn test_whitespace_content_rejected_before_store_call() {
        let store = MemoryStore::new();
        let (holder, _) = signed_in_session("taro@example.com").await;

        let err = add_review(&store, &holder, Uuid::new_v4(), "   \n\t ")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.rows(tables::REVIEWS).is_empty());
    }

    #[tokio::test]
    async fn test_add_review_requires_authentication() {
        let store = MemoryStore::new();
        let holder = SessionHolder::new();

        let err = add_review(&store, &holder, Uuid::new_v4(), "良書です")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthRequired));
    }

    #[tokio::test]
    async fn test_add_review_provisions_missing_profile() {
        let store = MemoryStore::new();
        let (holder, user) = signed_in_session("hanako@example.com").await;

        let review = add_review(&store, &holder, Uuid::new_v4(), "  参考になりました  ")
            .await
            .unwrap();

        assert_eq!(review.content, "参考になりました");
        assert_eq!(review.user_id, user.id);
        let profile = review.profile.expect("profile attached");
        assert_eq!(profile.username, "hanako");
        // The profile row now exists for the next submission
        assert_eq!(store.rows(tables::PROFILES).len(), 1);
    }

    #[tokio::test]
    async fn test_reviews_for_book_newest_first_with_profiles() {
        let store = MemoryStore::new();
        let (holder, _) = signed_in_session("hanako@example.com").await;
        let book_id = Uuid::new_v4();

        add_review(&store, &holder, book_id, "一件目").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        add_review(&store, &holder, book_id, "二件目").await.unwrap();

        let reviews = reviews_for_book(&store, book_id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].content, "二件目");
        assert!(reviews.iter().all(|r| r.profile.is_some()));
    }

    #[tokio::test]
    async fn test_multiple_reviews_per_user_and_book_allowed() {
        let store = MemoryStore::new();
        let (holder, _) = signed_in_session("taro@example.com").await;
        let book_id = Uuid::new_v4();

        add_review(&store, &holder, book_id, "最初の感想").await.unwrap();
        add_review(&store, &holder, book_id, "読み直した感想").await.unwrap();

        assert_eq!(store.rows(tables::REVIEWS).len(), 2);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_fails_and_leaves_row_unchanged() {
        let store = MemoryStore::new();
        let (owner, _) = signed_in_session("owner@example.com").await;
        let (intruder, _) = signed_in_session("intruder@example.com").await;
        let book_id = Uuid::new_v4();

        let review = add_review(&store, &owner, book_id, "元の内容").await.unwrap();

        let err = update_review(&store, &intruder, review.id, "改ざん")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFoundOrForbidden(_)));

        let reviews = reviews_for_book(&store, book_id).await.unwrap();
        assert_eq!(reviews[0].content, "元の内容");
    }

    #[tokio::test]
    async fn test_owner_can_update() {
        let store = MemoryStore::new();
        let (owner, _) = signed_in_session("owner@example.com").await;
        let book_id = Uuid::new_v4();

        let review = add_review(&store, &owner, book_id, "元の内容").await.unwrap();
        let updated = update_review(&store, &owner, review.id, " 修正後の内容 ")
            .await
            .unwrap();

        assert_eq!(updated.id, review.id);
        assert_eq!(updated.content, "修正後の内容");
        assert!(updated.updated_at >= review.updated_at);
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_fails() {
        let store = MemoryStore::new();
        let (owner, _) = signed_in_session("owner@example.com").await;
        let (intruder, _) = signed_in_session("intruder@example.com").await;
        let book_id = Uuid::new_v4();

        let review = add_review(&store, &owner, book_id, "残すべき内容").await.unwrap();

        let err = delete_review(&store, &intruder, review.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFoundOrForbidden(_)));
        assert_eq!(store.rows(tables::REVIEWS).len(), 1);
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        let store = MemoryStore::new();
        let (owner, _) = signed_in_session("owner@example.com").await;
        let book_id = Uuid::new_v4();

        let review = add_review(&store, &owner, book_id, "消す内容").await.unwrap();
        delete_review(&store, &owner, review.id).await.unwrap();
        assert!(store.rows(tables::REVIEWS).is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_review_reports_not_found() {
        let store = MemoryStore::new();
        let (owner, _) = signed_in_session("owner@example.com").await;

        let err = delete_review(&store, &owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFoundOrForbidden(_)));
    }
}
