//! # Contentgate Grants
//!
//! Issuance, revocation, extension and validation of content access grants.
//!
//! ## Overview
//!
//! Grants are mutable ledger records rather than replayed events: a grant is
//! written once at issuance and afterwards only revoked, extended, or
//! counted against when viewed.
//!
//! ## Key Concepts
//!
//! - **GrantLedger**: Issues grants after checking the content exists and the
//!   grantor owns it. Batch and work-contract issuance are built on top.
//! - **ValidityChecker**: Picks the grant that currently authorizes a
//!   requester, or synthesizes the owner's implicit grant.
//! - **QuickAccess**: Named presets bundling a duration, level and view cap.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use contentgate_core::{
//!     AccessDuration, AccessLevel, ContentRegistration, ContentType, ManualClock, StorageNetwork,
//! };
//! use contentgate_grants::{GrantLedger, ValidityChecker};
//! use contentgate_store::{ContentStore, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let clock = Arc::new(ManualClock::new(0));
//! let content = ContentRegistration::new(
//!     "H1",
//!     ContentType::Image,
//!     10,
//!     StorageNetwork::Ipfs,
//!     "alice",
//! )
//! .build(0);
//! store.insert_content(&content).unwrap();
//!
//! let ledger = GrantLedger::new(store.clone(), clock.clone());
//! ledger
//!     .issue(
//!         &"H1".into(),
//!         &"alice".into(),
//!         &"bob".into(),
//!         AccessDuration::DAY_PASS,
//!         AccessLevel::ViewOnly,
//!         None,
//!     )
//!     .unwrap();
//!
//! let checker = ValidityChecker::new(store, clock);
//! assert!(checker.has_valid_access(&"H1".into(), &"bob".into()).unwrap().is_some());
//! ```

pub mod batch;
pub mod error;
pub mod ledger;
pub mod presets;
pub mod validity;

pub use batch::{
    AgreementSource, AgreementVerified, BatchAccessGrant, PendingDeliverable,
    WorkContractAccessGrants,
};
pub use error::{GrantError, Result};
pub use ledger::GrantLedger;
pub use presets::QuickAccess;
pub use validity::{select_grant, AccessDecision, DenialReason, ValidityChecker};
