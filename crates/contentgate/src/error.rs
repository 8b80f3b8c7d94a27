//! Error types for the engine.

use contentgate_core::{ContentHash, CoreError};
use contentgate_grants::GrantError;
use contentgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during engine operations.
///
/// View-time denials are not errors; they come back inside a
/// [`ViewResponse`](crate::ViewResponse).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid identifier.
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Grant issuance or mutation error.
    #[error("grant error: {0}")]
    Grant(#[from] GrantError),

    /// Content is already registered under this hash.
    #[error("content already registered: {0}")]
    ContentExists(ContentHash),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
