//! # Contentgate Testkit
//!
//! Testing utilities for Contentgate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Expiry vectors**: Known durations with their exact expected expiry
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An engine over a memory store with a hand-driven clock
//! - **Fetchers**: Canned, failing and slow content fetchers
//!
//! ## Expiry Vectors
//!
//! ```rust
//! use contentgate_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, _) in verify_all_vectors() {
//!     assert!(passed, "{name}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use contentgate_core::resolve_expiry;
//! use contentgate_testkit::generators::{access_duration, timestamp};
//!
//! proptest! {
//!     #[test]
//!     fn expiry_never_precedes_issue(d in access_duration(), t in timestamp()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use contentgate_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let content = fixture.register_image("QmHash", "alice");
//! assert_eq!(content.registered_at, fixture.now());
//! ```

pub mod fetchers;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fetchers::{Failure, FailingFetcher, SlowFetcher, StaticFetcher};
pub use fixtures::{init_tracing, TestFixture, EPOCH};
pub use vectors::{all_vectors, verify_all_vectors, ExpiryVector};
