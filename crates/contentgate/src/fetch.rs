//! The off-chain content fetch collaborator.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use contentgate_core::{ContentReference, OutputFormat};

/// Errors reported by a [`ContentFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The storage network has no object under this locator.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The object was fetched but could not be decrypted.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Fetches, decrypts and transforms the object behind a content reference.
///
/// Only consulted for binary output formats.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Produce the object rendered in `format`.
    async fn fetch(&self, content: &ContentReference, format: OutputFormat)
        -> Result<Bytes, FetchError>;
}
