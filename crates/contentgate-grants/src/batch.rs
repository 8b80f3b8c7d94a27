//! Batch and work-contract issuance.
//!
//! Both are compositions over [`GrantLedger::issue`]. Each item is issued
//! independently: a failure on one hash never rolls back grants already
//! issued for earlier hashes in the same call.

use contentgate_core::{
    AccessDuration, AccessGrant, AccessLevel, AgreementId, ContentHash, PrincipalId,
};
use contentgate_store::{ContentStore, GrantStore};

use crate::error::{GrantError, Result};
use crate::ledger::GrantLedger;

/// Summary of grants issued together. Not itself persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAccessGrant {
    pub grantee: PrincipalId,
    pub grantor: PrincipalId,
    /// Grants that were issued, in request order.
    pub grants: Vec<AccessGrant>,
    /// Items that were rejected, in request order.
    pub failures: Vec<(ContentHash, GrantError)>,
}

impl BatchAccessGrant {
    fn new(grantee: &PrincipalId, grantor: &PrincipalId) -> Self {
        Self {
            grantee: grantee.clone(),
            grantor: grantor.clone(),
            grants: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether every item was issued.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Content hashes that were granted.
    pub fn granted_hashes(&self) -> impl Iterator<Item = &ContentHash> {
        self.grants.iter().map(|g| &g.content_hash)
    }
}

/// Supplies completion deadlines for work agreements.
pub trait AgreementSource: Send + Sync {
    /// The agreement's completion deadline (Unix ms), if it has one.
    fn completion_deadline(&self, agreement_id: &AgreementId) -> Option<i64>;
}

/// Event raised by the agreement state machine once the work is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementVerified {
    pub agreement_id: AgreementId,
    pub verified_at: i64,
}

/// Worker content owed to the client, not yet granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeliverable {
    pub content_hash: ContentHash,
    pub from: PrincipalId,
    pub to: PrincipalId,
}

/// Grants exchanged under one work agreement.
///
/// The client's materials are granted to the worker immediately; the
/// worker's deliverables stay pending until the agreement is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkContractAccessGrants {
    pub agreement_id: AgreementId,
    pub client: PrincipalId,
    pub worker: PrincipalId,
    /// Client to worker grants.
    pub granted: BatchAccessGrant,
    /// Worker to client content awaiting verification.
    pub pending: Vec<PendingDeliverable>,
    /// Deadline the client to worker grants were bound to.
    pub deadline: Option<i64>,
}

impl<S: ContentStore + GrantStore> GrantLedger<S> {
    /// Issue the same grant on several content hashes.
    ///
    /// Partial success: rejected items are reported in `failures`.
    pub fn issue_batch(
        &self,
        hashes: &[ContentHash],
        grantee: &PrincipalId,
        grantor: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
    ) -> BatchAccessGrant {
        self.issue_each(hashes, grantee, grantor, duration, access_level, None)
    }

    fn issue_each(
        &self,
        hashes: &[ContentHash],
        grantee: &PrincipalId,
        grantor: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
        deadline: Option<i64>,
    ) -> BatchAccessGrant {
        let mut batch = BatchAccessGrant::new(grantee, grantor);

        for hash in hashes {
            let issued = self.issue_until(
                hash,
                grantor,
                grantee,
                duration.clone(),
                access_level,
                None,
                deadline,
            );
            match issued {
                Ok(grant) => batch.grants.push(grant),
                Err(err) => {
                    tracing::warn!(content_hash = %hash, error = %err, "batch item rejected");
                    batch.failures.push((hash.clone(), err));
                }
            }
        }

        batch
    }

    /// Open a work-contract exchange.
    ///
    /// Client content is granted to the worker with a `WorkContract`
    /// duration. If `agreements` knows the completion deadline, those grants
    /// are stored expiring at it; otherwise they stay open until revoked.
    pub fn issue_for_work_contract(
        &self,
        agreement_id: &AgreementId,
        client: &PrincipalId,
        worker: &PrincipalId,
        client_to_worker: &[ContentHash],
        worker_to_client: &[ContentHash],
        access_level: AccessLevel,
        agreements: Option<&dyn AgreementSource>,
    ) -> WorkContractAccessGrants {
        let deadline = agreements.and_then(|a| a.completion_deadline(agreement_id));
        let granted = self.issue_each(
            client_to_worker,
            worker,
            client,
            AccessDuration::WorkContract(agreement_id.clone()),
            access_level,
            deadline,
        );

        let pending = worker_to_client
            .iter()
            .map(|hash| PendingDeliverable {
                content_hash: hash.clone(),
                from: worker.clone(),
                to: client.clone(),
            })
            .collect();

        tracing::info!(
            agreement_id = %agreement_id,
            granted = granted.grants.len(),
            rejected = granted.failures.len(),
            deadline = ?deadline,
            "opened work-contract exchange"
        );

        WorkContractAccessGrants {
            agreement_id: agreement_id.clone(),
            client: client.clone(),
            worker: worker.clone(),
            granted,
            pending,
            deadline,
        }
    }

    /// Grant the pending deliverables once the agreement is verified.
    ///
    /// Deliverables are granted permanently. Each one must still be owned by
    /// the worker. A deliverable the client already holds a usable permanent
    /// grant on from the worker counts as released and is skipped, so
    /// replaying the same event issues nothing new.
    pub fn release_deliverables(
        &self,
        contract: &WorkContractAccessGrants,
        event: &AgreementVerified,
        access_level: AccessLevel,
    ) -> Result<BatchAccessGrant> {
        if event.agreement_id != contract.agreement_id {
            return Err(GrantError::AgreementMismatch {
                expected: contract.agreement_id.clone(),
                got: event.agreement_id.clone(),
            });
        }

        let now = self.now();
        let mut hashes = Vec::with_capacity(contract.pending.len());
        for pending in &contract.pending {
            let held = self.store().grants_for(&pending.content_hash, &pending.to)?;
            let released = held.iter().any(|g| {
                g.grantor == pending.from
                    && g.duration == AccessDuration::Permanent
                    && g.is_usable_at(now)
            });
            if released {
                tracing::debug!(
                    content_hash = %pending.content_hash,
                    "deliverable already released"
                );
            } else {
                hashes.push(pending.content_hash.clone());
            }
        }
        let released = self.issue_batch(
            &hashes,
            &contract.client,
            &contract.worker,
            AccessDuration::Permanent,
            access_level,
        );

        tracing::info!(
            agreement_id = %contract.agreement_id,
            verified_at = event.verified_at,
            released = released.grants.len(),
            "released work-contract deliverables"
        );

        Ok(released)
    }
}
