//! # Contentgate
//!
//! The unified API for Contentgate: time- and usage-bounded access grants
//! over off-chain content, with audited view dispatch.
//!
//! ## Overview
//!
//! Contentgate sits between content owners and viewers:
//!
//! - **Registry**: Content references, keyed by content hash, owned forever
//!   by whoever registered them
//! - **Grants**: Owner-issued permissions, bounded by time, view count, or a
//!   work agreement
//! - **Views**: Authorized renderings of content, every attempt audited
//! - **Registry projections**: What a principal owns, shares and holds
//!
//! ## Key Concepts
//!
//! - **Owner grant**: Owners always have access. It is synthesized on demand,
//!   never stored, and never counted.
//! - **Denials are data**: A refused view is a [`ViewResponse`] with
//!   `access_valid == false`, not an error.
//! - **Generate, then count**: Output is produced before the view is counted,
//!   so a cancelled request consumes nothing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use contentgate::{AccessEngine, EngineConfig};
//! use contentgate::core::{ContentRegistration, ContentType, OutputFormat, StorageNetwork};
//! use contentgate::grants::QuickAccess;
//! use contentgate::store::MemoryStore;
//!
//! async fn example() {
//!     let engine = AccessEngine::new(MemoryStore::new(), EngineConfig::default());
//!
//!     engine
//!         .register_content(ContentRegistration::new(
//!             "QmHash",
//!             ContentType::Image,
//!             500_000,
//!             StorageNetwork::Ipfs,
//!             "alice",
//!         ))
//!         .unwrap();
//!
//!     engine
//!         .grant_quick_access(
//!             &"QmHash".into(),
//!             &"bob".into(),
//!             &"alice".into(),
//!             QuickAccess::DayPass,
//!         )
//!         .unwrap();
//!
//!     let response = engine
//!         .handle_view_request(&"QmHash".into(), &"bob".into(), OutputFormat::Summary)
//!         .await
//!         .unwrap();
//!     assert!(response.access_valid);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `contentgate::core` - Data model (ContentReference, AccessGrant, etc.)
//! - `contentgate::store` - Storage abstraction and in-memory store
//! - `contentgate::grants` - Grant ledger and validity checks

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod render;
pub mod view;

// Re-export component crates
pub use contentgate_core as core;
pub use contentgate_grants as grants;
pub use contentgate_store as store;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use engine::AccessEngine;
pub use envelope::{ContentKey, DecryptingFetcher, EncryptedObject, EnvelopeFormat, KeyRing};
pub use error::{EngineError, Result};
pub use fetch::{ContentFetcher, FetchError};
pub use registry::RegistryView;
pub use render::{render, RenderError};
pub use view::{ViewContent, ViewDenial, ViewDispatcher, ViewResponse};

// Re-export commonly used core types
pub use contentgate_core::{
    AccessDuration, AccessGrant, AccessLevel, AuditLogEntry, ContentHash, ContentReference,
    GrantId, OutputFormat, PrincipalId,
};
