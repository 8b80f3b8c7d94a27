//! Content fetchers for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use contentgate::{ContentFetcher, FetchError};
use contentgate_core::{ContentHash, ContentReference, ManualClock, OutputFormat};

/// Serves fixed bytes per content hash, whatever the format.
#[derive(Default)]
pub struct StaticFetcher {
    objects: HashMap<ContentHash, Bytes>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `hash`.
    pub fn with(mut self, hash: impl Into<ContentHash>, bytes: impl Into<Bytes>) -> Self {
        self.objects.insert(hash.into(), bytes.into());
        self
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(
        &self,
        content: &ContentReference,
        _format: OutputFormat,
    ) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .get(&content.content_hash)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(content.locator()))
    }
}

/// How a [`FailingFetcher`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Report a decryption failure.
    Decryption,
    /// Report a backend error.
    Backend,
    /// Never answer within `delay`.
    Stall(Duration),
}

/// A fetcher that always fails.
pub struct FailingFetcher(pub Failure);

#[async_trait]
impl ContentFetcher for FailingFetcher {
    async fn fetch(
        &self,
        content: &ContentReference,
        _format: OutputFormat,
    ) -> Result<Bytes, FetchError> {
        match self.0 {
            Failure::Decryption => Err(FetchError::Decryption(format!(
                "no key for {}",
                content.content_hash
            ))),
            Failure::Backend => Err(FetchError::Backend(anyhow::anyhow!(
                "gateway unreachable for {}",
                content.locator()
            ))),
            Failure::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Err(FetchError::NotFound(content.locator()))
            }
        }
    }
}

/// Serves fixed bytes after moving a manual clock forward, like a backend
/// slow enough for grants to lapse mid-request.
pub struct SlowFetcher {
    clock: Arc<ManualClock>,
    elapsed: i64,
    bytes: Bytes,
}

impl SlowFetcher {
    /// Advance `clock` by `elapsed` ms on every fetch, then return `bytes`.
    pub fn new(clock: Arc<ManualClock>, elapsed: i64, bytes: impl Into<Bytes>) -> Self {
        Self {
            clock,
            elapsed,
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl ContentFetcher for SlowFetcher {
    async fn fetch(
        &self,
        _content: &ContentReference,
        _format: OutputFormat,
    ) -> Result<Bytes, FetchError> {
        self.clock.advance(self.elapsed);
        Ok(self.bytes.clone())
    }
}
