//! Error types for the codec seam
//!
//! Engine operations never fail outward: dangling references, orphan
//! parents, and invalid snapshots are logged and recovered locally. The
//! only fallible surface is JSON encode/decode at the transport boundary.

use thiserror::Error;

/// Result alias for codec operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced when crossing the JSON boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid import payload: {0}")]
    InvalidImport(String),
}
