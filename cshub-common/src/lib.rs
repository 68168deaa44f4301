//! # CSHub Common Library
//!
//! Shared code for the customer success knowledge hub:
//! - Error taxonomy and result alias
//! - Configuration loading (CLI > env > config file > default)
//! - Normalized record models (store rows and adapter outputs)
//! - Date formatting helpers for the Japanese-language UI

pub mod config;
pub mod error;
pub mod models;
pub mod time;

pub use config::Config;
pub use error::{Error, Result};
