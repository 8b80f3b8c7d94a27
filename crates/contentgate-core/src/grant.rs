//! Access grants and their usability rules.
//!
//! A grant authorizes access at time `t` iff it is not revoked, `t` is not
//! past its expiry, and its view count is below its view cap.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::duration::AccessDuration;
use crate::types::{ContentHash, GrantId, PrincipalId};

/// What a grant lets its holder do, ordered from least to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    ViewOnly,
    Download,
    Share,
    Full,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::ViewOnly => f.write_str("view-only"),
            AccessLevel::Download => f.write_str("download"),
            AccessLevel::Share => f.write_str("share"),
            AccessLevel::Full => f.write_str("full"),
        }
    }
}

/// Classification of a grant at a point in time.
///
/// When several conditions hold at once, revocation wins over expiry and
/// expiry wins over an exhausted view cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantStatus {
    Active,
    Revoked,
    Expired,
    Exhausted,
}

/// A persisted permission for one grantee to access one content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grant_id: GrantId,

    pub content_hash: ContentHash,

    pub grantee: PrincipalId,

    /// Owner of the content at issuance.
    pub grantor: PrincipalId,

    pub duration: AccessDuration,

    /// Unix milliseconds.
    pub granted_at: i64,

    /// `None` never expires.
    pub expires_at: Option<i64>,

    pub access_level: AccessLevel,

    pub revoked: bool,

    pub revoked_at: Option<i64>,

    pub revocation_reason: Option<String>,

    /// Monotonic count of served views.
    pub view_count: u32,

    /// `None` is uncapped.
    pub max_views: Option<u32>,

    pub last_viewed_at: Option<i64>,
}

impl AccessGrant {
    /// Create a fresh, unused grant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        grant_id: GrantId,
        content_hash: ContentHash,
        grantor: PrincipalId,
        grantee: PrincipalId,
        duration: AccessDuration,
        granted_at: i64,
        expires_at: Option<i64>,
        access_level: AccessLevel,
        max_views: Option<u32>,
    ) -> Self {
        Self {
            grant_id,
            content_hash,
            grantee,
            grantor,
            duration,
            granted_at,
            expires_at,
            access_level,
            revoked: false,
            revoked_at: None,
            revocation_reason: None,
            view_count: 0,
            max_views,
            last_viewed_at: None,
        }
    }

    /// The implicit grant an owner holds over their own content.
    ///
    /// Never persisted; synthesized at check time.
    pub fn owner(content_hash: ContentHash, owner: PrincipalId, now: i64) -> Self {
        Self::new(
            GrantId::OWNER,
            content_hash,
            owner.clone(),
            owner,
            AccessDuration::Permanent,
            now,
            None,
            AccessLevel::Full,
            None,
        )
    }

    /// Whether this is a synthesized owner grant.
    pub fn is_owner_grant(&self) -> bool {
        self.grant_id == GrantId::OWNER && self.grantor == self.grantee
    }

    /// Classify this grant at time `now`.
    pub fn status_at(&self, now: i64) -> GrantStatus {
        if self.revoked {
            return GrantStatus::Revoked;
        }

        if let Some(expires) = self.expires_at {
            if now > expires {
                return GrantStatus::Expired;
            }
        }

        if let Some(max) = self.max_views {
            if self.view_count >= max {
                return GrantStatus::Exhausted;
            }
        }

        GrantStatus::Active
    }

    /// Check if this grant currently authorizes access.
    pub fn is_usable_at(&self, now: i64) -> bool {
        self.status_at(now) == GrantStatus::Active
    }

    /// Views left before the cap is reached, if capped.
    pub fn remaining_views(&self) -> Option<u32> {
        self.max_views.map(|max| max.saturating_sub(self.view_count))
    }

    /// Record a served view.
    pub fn record_view(&mut self, now: i64) {
        self.view_count = self.view_count.saturating_add(1);
        self.last_viewed_at = Some(now);
    }

    /// Mark the grant revoked. Later calls keep the first timestamp and reason.
    pub fn revoke(&mut self, now: i64, reason: Option<String>) {
        if self.revoked {
            return;
        }
        self.revoked = true;
        self.revoked_at = Some(now);
        self.revocation_reason = reason;
    }
}
