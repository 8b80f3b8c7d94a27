//! Error types for Contentgate Core.

use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("content hash must not be empty")]
    EmptyContentHash,

    #[error("principal identifier must not be empty")]
    EmptyPrincipal,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
