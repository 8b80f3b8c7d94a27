//! Store traits: the abstract interface for content, grant and audit persistence.
//!
//! These traits allow the engine to be storage-agnostic. All methods are
//! synchronous; implementations must not block for long.

use contentgate_core::{
    AccessGrant, AuditLogEntry, ContentHash, ContentReference, GrantId, GrantStatus, PrincipalId,
};

use crate::error::Result;

/// Result of inserting a keyed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted (new).
    Inserted,
    /// A record with this key already exists and was left untouched.
    AlreadyExists,
}

/// Outcome of an atomic view accounting attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedView {
    /// The grant was usable; its view count was incremented.
    Recorded(AccessGrant),
    /// The grant was no longer usable at the time of the attempt.
    Unusable(GrantStatus),
    /// No grant with this id exists.
    NotFound,
}

/// Content registry storage.
pub trait ContentStore: Send + Sync {
    /// Insert a content reference. Existing references are never overwritten.
    fn insert_content(&self, content: &ContentReference) -> Result<InsertResult>;

    /// Get a content reference by hash.
    fn get_content(&self, hash: &ContentHash) -> Result<Option<ContentReference>>;

    /// All content owned by `owner`, in registration order.
    fn content_by_owner(&self, owner: &PrincipalId) -> Result<Vec<ContentReference>>;
}

/// Grant ledger storage.
///
/// Listing methods return grants in issuance order.
pub trait GrantStore: Send + Sync {
    /// Insert a new grant.
    fn insert_grant(&self, grant: &AccessGrant) -> Result<InsertResult>;

    /// Get a grant by ID.
    fn get_grant(&self, id: &GrantId) -> Result<Option<AccessGrant>>;

    /// Grants on `content_hash` held by `grantee`.
    fn grants_for(&self, content_hash: &ContentHash, grantee: &PrincipalId)
        -> Result<Vec<AccessGrant>>;

    /// Every grant on `content_hash`.
    fn grants_on(&self, content_hash: &ContentHash) -> Result<Vec<AccessGrant>>;

    /// Grants issued by `grantor`.
    fn grants_by_grantor(&self, grantor: &PrincipalId) -> Result<Vec<AccessGrant>>;

    /// Grants received by `grantee`.
    fn grants_by_grantee(&self, grantee: &PrincipalId) -> Result<Vec<AccessGrant>>;

    /// Revoke a grant. Revoking twice keeps the first timestamp and reason.
    ///
    /// Returns the grant as stored afterwards, or `None` if unknown.
    fn revoke_grant(
        &self,
        id: &GrantId,
        at: i64,
        reason: Option<String>,
    ) -> Result<Option<AccessGrant>>;

    /// Overwrite a grant's expiry.
    ///
    /// Returns the grant as stored afterwards, or `None` if unknown.
    fn set_expiry(&self, id: &GrantId, expires_at: Option<i64>) -> Result<Option<AccessGrant>>;

    /// Atomically check that a grant is usable at `now` and count one view.
    fn record_view(&self, id: &GrantId, now: i64) -> Result<RecordedView>;
}

/// Append-only audit log storage.
pub trait AuditStore: Send + Sync {
    /// Append an entry.
    fn append_audit(&self, entry: &AuditLogEntry) -> Result<()>;

    /// Entries for `content_hash`, in append order.
    fn audit_for(&self, content_hash: &ContentHash) -> Result<Vec<AuditLogEntry>>;
}

/// A backend providing content, grant and audit storage.
pub trait Store: ContentStore + GrantStore + AuditStore {}

impl<T: ContentStore + GrantStore + AuditStore> Store for T {}
