//! Content fetch adapters
//!
//! Each adapter wraps one external HTTP API, normalizes its JSON (or
//! XML) response into a local record type, and degrades defensively:
//! missing credentials become typed configuration errors before any
//! request, non-2xx responses surface status and body, and the
//! multi-source article feed tolerates one source failing.

pub mod articles;
pub mod finance;
pub mod news;
pub mod qiita;
pub mod zenn;
