//! Common error types for the hub

use thiserror::Error;

/// Common result type for hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the hub service
///
/// The variants separate the failure classes the callers react to
/// differently: missing credentials are reported without attempting a
/// call, upstream HTTP failures carry the status and body, and a missing
/// session is distinct from a session that does not own the target row.
#[derive(Error, Debug)]
pub enum Error {
    /// Required credential missing or malformed; operation not attempted
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx response from a third-party content API
    #[error("Upstream API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level failure (wraps reqwest::Error)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No active session where one is required
    #[error("Authentication required")]
    AuthRequired,

    /// Row missing, or present but not owned by the requesting identity.
    /// The store does not distinguish the two cases for filtered mutations.
    #[error("Not found or not permitted: {0}")]
    NotFoundOrForbidden(String),

    /// Rejection from the backend record store
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed payload from an upstream service
    #[error("Parse error: {0}")]
    Parse(String),
}
