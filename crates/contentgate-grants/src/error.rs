//! Error types for grant operations.

use contentgate_core::{AgreementId, ContentHash, CoreError, GrantId, PrincipalId};
use contentgate_store::StoreError;
use thiserror::Error;

/// Errors that can occur while issuing or mutating grants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    /// Invalid identifier.
    #[error("invalid input: {0}")]
    Invalid(#[from] CoreError),

    /// No content is registered under this hash.
    #[error("content not found: {0}")]
    ContentNotFound(ContentHash),

    /// The grantor does not own the content.
    #[error("{grantor} does not own {content_hash}")]
    NotOwner {
        content_hash: ContentHash,
        grantor: PrincipalId,
    },

    /// Grant not found.
    #[error("grant not found: {0}")]
    GrantNotFound(GrantId),

    /// A view cap of zero would never authorize anything.
    #[error("max_views must be at least 1")]
    InvalidViewLimit,

    /// A verification event was presented for a different agreement.
    #[error("verification for agreement {got} does not match {expected}")]
    AgreementMismatch {
        expected: AgreementId,
        got: AgreementId,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for grant operations.
pub type Result<T> = std::result::Result<T, GrantError>;
