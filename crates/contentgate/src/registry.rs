//! Per-principal registry projection.

use contentgate_core::{AccessGrant, ContentReference, PrincipalId};
use contentgate_store::{ContentStore, GrantStore, Store};

use crate::error::Result;

/// What a principal owns, has shared, and has been given.
///
/// A read-only snapshot; grant lists only include grants usable at the time
/// it was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryView {
    pub owner: PrincipalId,
    /// Registered content, in registration order.
    pub owned_content: Vec<ContentReference>,
    /// Usable grants issued by the owner.
    pub granted_access: Vec<AccessGrant>,
    /// Usable grants held by the owner.
    pub received_grants: Vec<AccessGrant>,
    /// Views counted on every grant over owned content, usable or not.
    pub total_views: u64,
}

impl RegistryView {
    /// Build the projection for `owner` at time `now`.
    pub fn collect<S: Store>(store: &S, owner: &PrincipalId, now: i64) -> Result<Self> {
        let owned_content = store.content_by_owner(owner)?;

        let mut total_views = 0u64;
        for content in &owned_content {
            total_views += store
                .grants_on(&content.content_hash)?
                .iter()
                .map(|g| u64::from(g.view_count))
                .sum::<u64>();
        }

        let usable = |grants: Vec<AccessGrant>| -> Vec<AccessGrant> {
            grants.into_iter().filter(|g| g.is_usable_at(now)).collect()
        };

        Ok(Self {
            owner: owner.clone(),
            granted_access: usable(store.grants_by_grantor(owner)?),
            received_grants: usable(store.grants_by_grantee(owner)?),
            owned_content,
            total_views,
        })
    }
}
