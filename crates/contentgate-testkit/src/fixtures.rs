//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use contentgate::{AccessEngine, ContentFetcher, EngineConfig};
use contentgate_core::{
    Clock, ContentReference, ContentRegistration, ContentType, ManualClock, StorageNetwork,
};
use contentgate_store::MemoryStore;

/// Start time of every fixture clock: 2025-01-14T16:00:00Z.
pub const EPOCH: i64 = 1_736_870_400_000;

/// An engine over a memory store with a hand-driven clock.
pub struct TestFixture {
    pub engine: AccessEngine<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a fixture with `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(EPOCH));
        let engine = AccessEngine::new(MemoryStore::new(), config).with_clock(clock.clone());
        Self { engine, clock }
    }

    /// Serve binary formats through `fetcher`.
    pub fn with_fetcher(self, fetcher: impl ContentFetcher + 'static) -> Self {
        Self {
            engine: self.engine.with_fetcher(fetcher),
            clock: self.clock,
        }
    }

    /// Current fixture time.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: i64) {
        self.clock.advance(millis);
    }

    /// Register 500 kB of unencrypted IPFS content.
    pub fn register(&self, hash: &str, content_type: ContentType, owner: &str) -> ContentReference {
        self.register_with(ContentRegistration::new(
            hash,
            content_type,
            500_000,
            StorageNetwork::Ipfs,
            owner,
        ))
    }

    /// Register an image.
    pub fn register_image(&self, hash: &str, owner: &str) -> ContentReference {
        self.register(hash, ContentType::Image, owner)
    }

    /// Register arbitrary content, panicking on failure.
    pub fn register_with(&self, registration: ContentRegistration) -> ContentReference {
        self.engine
            .register_content(registration)
            .expect("fixture registration failed")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-writer `tracing` subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
