//! # Contentgate Core
//!
//! Pure primitives for the Contentgate access engine: content references,
//! access durations, grants, and audit entries.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over the access-control data model.
//!
//! ## Key Types
//!
//! - [`ContentReference`] - Metadata for a piece of off-chain content
//! - [`AccessDuration`] - Closed set of grant lifetimes, resolved by [`resolve_expiry`]
//! - [`AccessGrant`] - A time- and usage-bounded permission to view content
//! - [`AuditLogEntry`] - One access attempt, successful or not
//!
//! ## Time
//!
//! All timestamps are Unix milliseconds. Components that need the current
//! time take a [`Clock`] so tests can drive time explicitly.

pub mod audit;
pub mod content;
pub mod duration;
pub mod error;
pub mod format;
pub mod grant;
pub mod time;
pub mod types;

pub use audit::{AccessType, AuditLogEntry};
pub use content::{
    ContentReference, ContentRegistration, ContentType, EncryptionType, StorageNetwork,
};
pub use duration::{resolve_expiry, AccessDuration, DaySpan, HourSpan, DAY_MS, HOUR_MS};
pub use error::{CoreError, Result};
pub use format::OutputFormat;
pub use grant::{AccessGrant, AccessLevel, GrantStatus};
pub use time::{Clock, ManualClock, SystemClock};
pub use types::{AgreementId, ContentHash, GrantId, PrincipalId};
