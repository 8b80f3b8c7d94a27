//! In-memory implementation of the store traits.
//!
//! Each table sits behind its own `RwLock`. Nothing survives the process.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use contentgate_core::{
    AccessGrant, AuditLogEntry, ContentHash, ContentReference, GrantId, GrantStatus, PrincipalId,
};

use crate::error::{Result, StoreError};
use crate::traits::{AuditStore, ContentStore, GrantStore, InsertResult, RecordedView};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    content: RwLock<ContentTable>,
    grants: RwLock<GrantTable>,
    audit: RwLock<HashMap<ContentHash, Vec<AuditLogEntry>>>,
}

#[derive(Default)]
struct ContentTable {
    /// References indexed by hash.
    by_hash: HashMap<ContentHash, ContentReference>,

    /// Registration order.
    order: Vec<ContentHash>,
}

#[derive(Default)]
struct GrantTable {
    /// Grants indexed by ID.
    grants: HashMap<GrantId, AccessGrant>,

    /// Index: (content, grantee) -> grant IDs in issuance order.
    by_holder: HashMap<(ContentHash, PrincipalId), Vec<GrantId>>,

    /// Index: content -> grant IDs.
    by_content: HashMap<ContentHash, Vec<GrantId>>,

    /// Index: grantor -> grant IDs.
    by_grantor: HashMap<PrincipalId, Vec<GrantId>>,

    /// Index: grantee -> grant IDs.
    by_grantee: HashMap<PrincipalId, Vec<GrantId>>,
}

impl GrantTable {
    fn collect(&self, ids: Option<&Vec<GrantId>>) -> Vec<AccessGrant> {
        ids.map(|ids| ids.iter().filter_map(|id| self.grants.get(id).cloned()).collect())
            .unwrap_or_default()
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, table: &'static str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| StoreError::LockPoisoned(table))
}

fn write<'a, T>(lock: &'a RwLock<T>, table: &'static str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| StoreError::LockPoisoned(table))
}

impl ContentStore for MemoryStore {
    fn insert_content(&self, content: &ContentReference) -> Result<InsertResult> {
        let mut table = write(&self.content, "content")?;

        if table.by_hash.contains_key(&content.content_hash) {
            return Ok(InsertResult::AlreadyExists);
        }

        table
            .by_hash
            .insert(content.content_hash.clone(), content.clone());
        table.order.push(content.content_hash.clone());

        Ok(InsertResult::Inserted)
    }

    fn get_content(&self, hash: &ContentHash) -> Result<Option<ContentReference>> {
        let table = read(&self.content, "content")?;
        Ok(table.by_hash.get(hash).cloned())
    }

    fn content_by_owner(&self, owner: &PrincipalId) -> Result<Vec<ContentReference>> {
        let table = read(&self.content, "content")?;
        Ok(table
            .order
            .iter()
            .filter_map(|hash| table.by_hash.get(hash))
            .filter(|c| &c.owner == owner)
            .cloned()
            .collect())
    }
}

impl GrantStore for MemoryStore {
    fn insert_grant(&self, grant: &AccessGrant) -> Result<InsertResult> {
        let mut table = write(&self.grants, "grants")?;

        if table.grants.contains_key(&grant.grant_id) {
            return Ok(InsertResult::AlreadyExists);
        }

        let id = grant.grant_id;
        table.grants.insert(id, grant.clone());

        // Update indexes
        table
            .by_holder
            .entry((grant.content_hash.clone(), grant.grantee.clone()))
            .or_default()
            .push(id);
        table
            .by_content
            .entry(grant.content_hash.clone())
            .or_default()
            .push(id);
        table
            .by_grantor
            .entry(grant.grantor.clone())
            .or_default()
            .push(id);
        table
            .by_grantee
            .entry(grant.grantee.clone())
            .or_default()
            .push(id);

        Ok(InsertResult::Inserted)
    }

    fn get_grant(&self, id: &GrantId) -> Result<Option<AccessGrant>> {
        let table = read(&self.grants, "grants")?;
        Ok(table.grants.get(id).cloned())
    }

    fn grants_for(
        &self,
        content_hash: &ContentHash,
        grantee: &PrincipalId,
    ) -> Result<Vec<AccessGrant>> {
        let table = read(&self.grants, "grants")?;
        let key = (content_hash.clone(), grantee.clone());
        Ok(table.collect(table.by_holder.get(&key)))
    }

    fn grants_on(&self, content_hash: &ContentHash) -> Result<Vec<AccessGrant>> {
        let table = read(&self.grants, "grants")?;
        Ok(table.collect(table.by_content.get(content_hash)))
    }

    fn grants_by_grantor(&self, grantor: &PrincipalId) -> Result<Vec<AccessGrant>> {
        let table = read(&self.grants, "grants")?;
        Ok(table.collect(table.by_grantor.get(grantor)))
    }

    fn grants_by_grantee(&self, grantee: &PrincipalId) -> Result<Vec<AccessGrant>> {
        let table = read(&self.grants, "grants")?;
        Ok(table.collect(table.by_grantee.get(grantee)))
    }

    fn revoke_grant(
        &self,
        id: &GrantId,
        at: i64,
        reason: Option<String>,
    ) -> Result<Option<AccessGrant>> {
        let mut table = write(&self.grants, "grants")?;
        Ok(table.grants.get_mut(id).map(|grant| {
            grant.revoke(at, reason);
            grant.clone()
        }))
    }

    fn set_expiry(&self, id: &GrantId, expires_at: Option<i64>) -> Result<Option<AccessGrant>> {
        let mut table = write(&self.grants, "grants")?;
        Ok(table.grants.get_mut(id).map(|grant| {
            grant.expires_at = expires_at;
            grant.clone()
        }))
    }

    fn record_view(&self, id: &GrantId, now: i64) -> Result<RecordedView> {
        let mut table = write(&self.grants, "grants")?;

        let Some(grant) = table.grants.get_mut(id) else {
            return Ok(RecordedView::NotFound);
        };

        match grant.status_at(now) {
            GrantStatus::Active => {
                grant.record_view(now);
                Ok(RecordedView::Recorded(grant.clone()))
            }
            status => {
                tracing::debug!(grant_id = %id, ?status, "view not recorded");
                Ok(RecordedView::Unusable(status))
            }
        }
    }
}

impl AuditStore for MemoryStore {
    fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut log = write(&self.audit, "audit")?;
        log.entry(entry.content_hash.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    fn audit_for(&self, content_hash: &ContentHash) -> Result<Vec<AuditLogEntry>> {
        let log = read(&self.audit, "audit")?;
        Ok(log.get(content_hash).cloned().unwrap_or_default())
    }
}
