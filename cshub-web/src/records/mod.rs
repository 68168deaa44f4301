//! Interaction layer over the backend record store
//!
//! Reads and mutates the hub's record kinds (profiles, likes, reviews)
//! on behalf of the signed-in visitor, plus the read-only reference
//! tables (books, trend metrics). Profile joins are denormalized here,
//! in memory, rather than pushed into the store.

pub mod books;
pub mod likes;
pub mod profiles;
pub mod reviews;
pub mod trends;

/// Table names in the backend record store
pub(crate) mod tables {
    pub const BOOKS: &str = "books";
    pub const LIKES: &str = "books_likes";
    pub const REVIEWS: &str = "books_reviews";
    pub const PROFILES: &str = "users_profiles";
    pub const METRICS: &str = "saas_metrics";
}
