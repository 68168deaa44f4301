//! Book reference data queries
//!
//! Books are created out-of-band; this layer only reads them.

use cshub_common::models::Book;
use cshub_common::Result;

use super::tables;
use crate::store::{decode_rows, Direction, RecordStore, SelectQuery};

/// All books, oldest first
pub async fn all_books(store: &dyn RecordStore) -> Result<Vec<Book>> {
    let rows = store
        .select(
            tables::BOOKS,
            SelectQuery::new().order_by("created_at", Direction::Ascending),
        )
        .await?;
    decode_rows(rows)
}

/// Books in one category, oldest first
pub async fn books_by_category(store: &dyn RecordStore, category: &str) -> Result<Vec<Book>> {
    let rows = store
        .select(
            tables::BOOKS,
            SelectQuery::new()
                .eq("category", category)
                .order_by("created_at", Direction::Ascending),
        )
        .await?;
    decode_rows(rows)
}
