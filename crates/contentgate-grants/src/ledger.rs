//! The grant ledger: issuance, revocation and extension.

use std::sync::Arc;

use contentgate_core::{
    resolve_expiry, AccessDuration, AccessGrant, AccessLevel, Clock, ContentHash, CoreError,
    GrantId, PrincipalId,
};
use contentgate_store::{ContentStore, GrantStore, InsertResult, StoreError};

use crate::error::{GrantError, Result};
use crate::presets::QuickAccess;

/// Issues and mutates access grants.
///
/// Every issuance checks that the content is registered and that the grantor
/// is its owner. The ledger trusts the identities it is handed.
pub struct GrantLedger<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for GrantLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ContentStore + GrantStore> GrantLedger<S> {
    /// Create a ledger over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current time from the ledger's clock.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Issue a grant on `content_hash` from `grantor` to `grantee`.
    ///
    /// Single-view grants are always capped at one view.
    pub fn issue(
        &self,
        content_hash: &ContentHash,
        grantor: &PrincipalId,
        grantee: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
        max_views: Option<u32>,
    ) -> Result<AccessGrant> {
        self.issue_until(
            content_hash,
            grantor,
            grantee,
            duration,
            access_level,
            max_views,
            None,
        )
    }

    /// Issue a grant whose expiry is `deadline` when given, instead of the
    /// one resolved from `duration`. The grant is stored already bound.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn issue_until(
        &self,
        content_hash: &ContentHash,
        grantor: &PrincipalId,
        grantee: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
        max_views: Option<u32>,
        deadline: Option<i64>,
    ) -> Result<AccessGrant> {
        if grantor.is_empty() || grantee.is_empty() {
            return Err(CoreError::EmptyPrincipal.into());
        }
        if max_views == Some(0) {
            return Err(GrantError::InvalidViewLimit);
        }

        let content = self
            .store
            .get_content(content_hash)?
            .ok_or_else(|| GrantError::ContentNotFound(content_hash.clone()))?;

        if &content.owner != grantor {
            return Err(GrantError::NotOwner {
                content_hash: content_hash.clone(),
                grantor: grantor.clone(),
            });
        }

        let max_views = if duration.is_single_view() {
            Some(1)
        } else {
            max_views
        };

        let granted_at = self.now();
        let expires_at = deadline.or_else(|| resolve_expiry(&duration, granted_at));
        let grant = AccessGrant::new(
            GrantId::derive(content_hash, grantee, granted_at),
            content_hash.clone(),
            grantor.clone(),
            grantee.clone(),
            duration,
            granted_at,
            expires_at,
            access_level,
            max_views,
        );

        if self.store.insert_grant(&grant)? == InsertResult::AlreadyExists {
            return Err(StoreError::InvalidData(format!(
                "grant id collision: {}",
                grant.grant_id
            ))
            .into());
        }

        tracing::info!(
            grant_id = %grant.grant_id,
            content_hash = %content_hash,
            grantee = %grantee,
            access_level = %access_level,
            expires_at = ?grant.expires_at,
            "issued access grant"
        );

        Ok(grant)
    }

    /// Issue a grant shaped by a [`QuickAccess`] preset.
    pub fn issue_quick(
        &self,
        content_hash: &ContentHash,
        grantee: &PrincipalId,
        grantor: &PrincipalId,
        preset: QuickAccess,
    ) -> Result<AccessGrant> {
        self.issue(
            content_hash,
            grantor,
            grantee,
            preset.duration(),
            preset.access_level(),
            preset.max_views(),
        )
    }

    /// Revoke a grant. Revoking an already revoked grant is a no-op.
    pub fn revoke(&self, grant_id: &GrantId, reason: Option<&str>) -> Result<AccessGrant> {
        let now = self.now();
        let grant = self
            .store
            .revoke_grant(grant_id, now, reason.map(String::from))?
            .ok_or(GrantError::GrantNotFound(*grant_id))?;

        tracing::info!(grant_id = %grant_id, reason = ?reason, "revoked access grant");
        Ok(grant)
    }

    /// Overwrite a grant's expiry. `None` makes it open-ended.
    ///
    /// The new expiry is not required to be later than the current one.
    pub fn extend(&self, grant_id: &GrantId, new_expiry: Option<i64>) -> Result<AccessGrant> {
        let previous = self
            .store
            .get_grant(grant_id)?
            .ok_or(GrantError::GrantNotFound(*grant_id))?;

        let grant = self
            .store
            .set_expiry(grant_id, new_expiry)?
            .ok_or(GrantError::GrantNotFound(*grant_id))?;

        let shortened = match (previous.expires_at, new_expiry) {
            (None, Some(_)) => true,
            (Some(old), Some(new)) => new < old,
            _ => false,
        };
        if shortened {
            tracing::warn!(
                grant_id = %grant_id,
                previous = ?previous.expires_at,
                new = ?new_expiry,
                "extension shortens grant lifetime"
            );
        } else {
            tracing::info!(grant_id = %grant_id, expires_at = ?new_expiry, "extended access grant");
        }

        Ok(grant)
    }

    /// Get a grant by ID.
    pub fn get(&self, grant_id: &GrantId) -> Result<Option<AccessGrant>> {
        Ok(self.store.get_grant(grant_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentgate_core::{
        ContentRegistration, ContentType, GrantStatus, ManualClock, StorageNetwork, DAY_MS, HOUR_MS,
    };
    use contentgate_store::MemoryStore;

    fn setup() -> (GrantLedger<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let content = ContentRegistration::new(
            "H1",
            ContentType::Image,
            500_000,
            StorageNetwork::Ipfs,
            "alice",
        )
        .build(0);
        store.insert_content(&content).unwrap();

        let clock = Arc::new(ManualClock::new(1_000));
        (GrantLedger::new(store, clock.clone()), clock)
    }

    #[test]
    fn test_issue_resolves_expiry() {
        let (ledger, _) = setup();
        let grant = ledger
            .issue(
                &"H1".into(),
                &"alice".into(),
                &"bob".into(),
                AccessDuration::Hours(contentgate_core::HourSpan::Eight),
                AccessLevel::Download,
                None,
            )
            .unwrap();

        assert_eq!(grant.granted_at, 1_000);
        assert_eq!(grant.expires_at, Some(1_000 + 8 * HOUR_MS));
        assert_eq!(grant.view_count, 0);
        assert!(!grant.revoked);
        assert_eq!(ledger.get(&grant.grant_id).unwrap(), Some(grant));
    }

    #[test]
    fn test_issue_requires_content() {
        let (ledger, _) = setup();
        let err = ledger
            .issue(
                &"missing".into(),
                &"alice".into(),
                &"bob".into(),
                AccessDuration::Permanent,
                AccessLevel::ViewOnly,
                None,
            )
            .unwrap_err();

        assert_eq!(err, GrantError::ContentNotFound("missing".into()));
    }

    #[test]
    fn test_issue_requires_owner() {
        let (ledger, _) = setup();
        let err = ledger
            .issue(
                &"H1".into(),
                &"mallory".into(),
                &"bob".into(),
                AccessDuration::Permanent,
                AccessLevel::ViewOnly,
                None,
            )
            .unwrap_err();

        assert!(matches!(err, GrantError::NotOwner { .. }));
        assert!(ledger.store().grants_by_grantee(&"bob".into()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_grantee_rejected() {
        let (ledger, _) = setup();
        let err = ledger
            .issue(
                &"H1".into(),
                &"alice".into(),
                &"".into(),
                AccessDuration::Permanent,
                AccessLevel::ViewOnly,
                None,
            )
            .unwrap_err();

        assert_eq!(err, GrantError::Invalid(CoreError::EmptyPrincipal));
        assert!(ledger.store().grants_on(&"H1".into()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_view_cap_rejected() {
        let (ledger, _) = setup();
        let err = ledger
            .issue(
                &"H1".into(),
                &"alice".into(),
                &"bob".into(),
                AccessDuration::Permanent,
                AccessLevel::ViewOnly,
                Some(0),
            )
            .unwrap_err();

        assert_eq!(err, GrantError::InvalidViewLimit);
    }

    #[test]
    fn test_single_view_always_capped() {
        let (ledger, _) = setup();
        let grant = ledger
            .issue(
                &"H1".into(),
                &"alice".into(),
                &"bob".into(),
                AccessDuration::SingleView,
                AccessLevel::ViewOnly,
                Some(10),
            )
            .unwrap();

        assert_eq!(grant.max_views, Some(1));
        assert_eq!(grant.expires_at, Some(1_000 + DAY_MS));
    }

    #[test]
    fn test_quick_access_presets() {
        let (ledger, _) = setup();
        let day = ledger
            .issue_quick(&"H1".into(), &"bob".into(), &"alice".into(), QuickAccess::DayPass)
            .unwrap();
        assert_eq!(day.expires_at, Some(1_000 + DAY_MS));
        assert_eq!(day.access_level, AccessLevel::ViewOnly);

        let month = ledger
            .issue_quick(&"H1".into(), &"bob".into(), &"alice".into(), QuickAccess::MonthAccess)
            .unwrap();
        assert_eq!(month.access_level, AccessLevel::Download);
        assert_eq!(month.expires_at, Some(1_000 + 30 * DAY_MS));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let (ledger, clock) = setup();
        let grant = ledger
            .issue_quick(&"H1".into(), &"bob".into(), &"alice".into(), QuickAccess::WeekAccess)
            .unwrap();

        let first = ledger.revoke(&grant.grant_id, Some("contract ended")).unwrap();
        clock.advance(HOUR_MS);
        let second = ledger.revoke(&grant.grant_id, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.revocation_reason.as_deref(), Some("contract ended"));
        assert_eq!(second.status_at(0), GrantStatus::Revoked);
    }

    #[test]
    fn test_unknown_grant() {
        let (ledger, _) = setup();
        let id = GrantId::from_bytes([3; 16]);

        assert_eq!(ledger.revoke(&id, None).unwrap_err(), GrantError::GrantNotFound(id));
        assert_eq!(ledger.extend(&id, None).unwrap_err(), GrantError::GrantNotFound(id));
    }

    #[test]
    fn test_extend_overwrites_without_monotonicity() {
        let (ledger, _) = setup();
        let grant = ledger
            .issue_quick(&"H1".into(), &"bob".into(), &"alice".into(), QuickAccess::DayPass)
            .unwrap();

        let longer = ledger.extend(&grant.grant_id, Some(10 * DAY_MS)).unwrap();
        assert_eq!(longer.expires_at, Some(10 * DAY_MS));

        let shorter = ledger.extend(&grant.grant_id, Some(500)).unwrap();
        assert_eq!(shorter.expires_at, Some(500));

        let open = ledger.extend(&grant.grant_id, None).unwrap();
        assert_eq!(open.expires_at, None);
    }
}
