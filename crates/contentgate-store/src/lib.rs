//! # Contentgate Store
//!
//! Storage abstraction for Contentgate. Content references, grants, and audit
//! entries live behind repository traits so the engine is storage-agnostic.
//!
//! ## Key Types
//!
//! - [`ContentStore`] - Content registry (insert once, never delete)
//! - [`GrantStore`] - Grant ledger storage, including atomic view accounting
//! - [`AuditStore`] - Append-only audit log
//! - [`Store`] - Umbrella trait for a backend providing all three
//! - [`MemoryStore`] - In-memory implementation
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: Inserting an existing key returns `AlreadyExists`
//!   and leaves the stored value untouched.
//! - **Atomic view accounting**: [`GrantStore::record_view`] re-checks
//!   usability and increments the view count under a single write guard, so
//!   concurrent viewers of one grant never lose updates or overrun its cap.
//! - **No deletion**: none of the traits expose a delete path.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{AuditStore, ContentStore, GrantStore, InsertResult, RecordedView, Store};
