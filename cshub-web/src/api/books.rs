//! Book, like, and review endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use cshub_common::models::{Book, Like, Review};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;
use crate::records::{books, likes, reviews};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BooksQuery {
    pub category: Option<String>,
}

/// GET /api/books[?category=]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BooksQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let store = state.store.as_ref();
    let books = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => books::books_by_category(store, category).await?,
        None => books::all_books(store).await?,
    };
    Ok(Json(books))
}

/// GET /api/books/:id/likes
pub async fn book_likes(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let likes = likes::likes_for_book(state.store.as_ref(), book_id).await?;
    Ok(Json(likes))
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// New liked-state after the toggle
    pub liked: bool,
}

/// POST /api/books/:id/likes/toggle
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let liked = likes::toggle_like(state.store.as_ref(), &state.session, book_id).await?;
    Ok(Json(ToggleResponse { liked }))
}

/// GET /api/books/:id/reviews
pub async fn book_reviews(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = reviews::reviews_for_book(state.store.as_ref(), book_id).await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub content: String,
}

/// POST /api/books/:id/reviews
pub async fn add_review(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let review =
        reviews::add_review(state.store.as_ref(), &state.session, book_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/reviews/:id
pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<Review>, ApiError> {
    let review =
        reviews::update_review(state.store.as_ref(), &state.session, review_id, &body.content)
            .await?;
    Ok(Json(review))
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    reviews::delete_review(state.store.as_ref(), &state.session, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books/:id/likes", get(book_likes))
        .route("/api/books/:id/likes/toggle", post(toggle_like))
        .route("/api/books/:id/reviews", get(book_reviews).post(add_review))
        .route("/api/reviews/:id", put(update_review).delete(delete_review))
}
