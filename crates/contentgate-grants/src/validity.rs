//! Validity checks: does a requester currently have access to content?

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use contentgate_core::{AccessGrant, Clock, ContentHash, ContentReference, GrantStatus, PrincipalId};
use contentgate_store::{ContentStore, GrantStore};

use crate::error::Result;

/// Why a requester was found to have no usable grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// The requester holds no grant on the content.
    NoGrant,
    Revoked,
    Expired,
    ViewLimitReached,
}

impl DenialReason {
    fn from_status(status: GrantStatus) -> Self {
        match status {
            GrantStatus::Revoked => DenialReason::Revoked,
            GrantStatus::Expired => DenialReason::Expired,
            GrantStatus::Exhausted => DenialReason::ViewLimitReached,
            // An active grant never explains a denial; treat it as absent.
            GrantStatus::Active => DenialReason::NoGrant,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NoGrant => f.write_str("no access grant"),
            DenialReason::Revoked => f.write_str("access grant revoked"),
            DenialReason::Expired => f.write_str("access grant expired"),
            DenialReason::ViewLimitReached => f.write_str("view limit reached"),
        }
    }
}

/// Result of checking a requester against a content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is authorized by this grant (possibly the synthetic owner grant).
    Granted(AccessGrant),
    /// The content exists but the requester may not access it.
    Denied(DenialReason),
    /// No content is registered under the hash.
    ContentNotFound,
}

impl AccessDecision {
    /// The authorizing grant, if access was granted.
    pub fn into_grant(self) -> Option<AccessGrant> {
        match self {
            AccessDecision::Granted(grant) => Some(grant),
            _ => None,
        }
    }
}

/// Decides whether a requester currently holds access.
pub struct ValidityChecker<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for ValidityChecker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ContentStore + GrantStore> ValidityChecker<S> {
    /// Create a checker over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The grant authorizing `requester` to access `content_hash` right now.
    ///
    /// Falls back to the owner's implicit grant when no stored grant applies.
    pub fn has_valid_access(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
    ) -> Result<Option<AccessGrant>> {
        Ok(self.check(content_hash, requester)?.into_grant())
    }

    /// Check access and explain a denial.
    pub fn check(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
    ) -> Result<AccessDecision> {
        match self.store.get_content(content_hash)? {
            Some(content) => self.check_content(&content, requester, self.clock.now_millis()),
            None => Ok(AccessDecision::ContentNotFound),
        }
    }

    /// Check access to already-loaded content at time `now`.
    pub fn check_content(
        &self,
        content: &ContentReference,
        requester: &PrincipalId,
        now: i64,
    ) -> Result<AccessDecision> {
        let grants = self.store.grants_for(&content.content_hash, requester)?;

        if let Some(best) = select_grant(&grants, now) {
            tracing::debug!(
                content_hash = %content.content_hash,
                requester = %requester,
                grant_id = %best.grant_id,
                "access granted"
            );
            return Ok(AccessDecision::Granted(best.clone()));
        }

        if &content.owner == requester {
            return Ok(AccessDecision::Granted(AccessGrant::owner(
                content.content_hash.clone(),
                requester.clone(),
                now,
            )));
        }

        // Explain the denial with the most recently issued grant.
        let reason = grants
            .iter()
            .max_by_key(|g| g.granted_at)
            .map(|g| DenialReason::from_status(g.status_at(now)))
            .unwrap_or(DenialReason::NoGrant);

        tracing::debug!(
            content_hash = %content.content_hash,
            requester = %requester,
            %reason,
            "access denied"
        );
        Ok(AccessDecision::Denied(reason))
    }
}

/// Pick the usable grant to authorize with.
///
/// Most permissive level first, then latest expiry (never-expiring wins),
/// then most recently granted.
pub fn select_grant(grants: &[AccessGrant], now: i64) -> Option<&AccessGrant> {
    grants
        .iter()
        .filter(|g| g.is_usable_at(now))
        .max_by(|a, b| compare_preference(a, b))
}

fn compare_preference(a: &AccessGrant, b: &AccessGrant) -> Ordering {
    let expiry = |g: &AccessGrant| g.expires_at.unwrap_or(i64::MAX);
    a.access_level
        .cmp(&b.access_level)
        .then_with(|| expiry(a).cmp(&expiry(b)))
        .then_with(|| a.granted_at.cmp(&b.granted_at))
}
