//! The access engine: unified API over registry, grants, views and audit.

use std::sync::Arc;

use contentgate_core::{
    AccessDuration, AccessGrant, AccessLevel, AccessType, AgreementId, AuditLogEntry, Clock,
    ContentHash, ContentReference, ContentRegistration, CoreError, GrantId, OutputFormat,
    PrincipalId, SystemClock,
};
use contentgate_grants::{
    AccessDecision, AgreementSource, AgreementVerified, BatchAccessGrant, GrantLedger,
    QuickAccess, ValidityChecker, WorkContractAccessGrants,
};
use contentgate_store::{AuditStore, ContentStore, InsertResult, Store};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::fetch::ContentFetcher;
use crate::registry::RegistryView;
use crate::view::{ViewDispatcher, ViewResponse};

/// The main engine struct.
///
/// Provides a unified API for:
/// - Registering content
/// - Issuing, revoking and extending grants
/// - Checking access
/// - Serving views and previews
/// - Reading audit logs and registry projections
///
/// Identities are trusted as given; the engine does not authenticate callers.
pub struct AccessEngine<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Source of the current time.
    clock: Arc<dyn Clock>,
    /// Configuration.
    config: EngineConfig,
    ledger: GrantLedger<S>,
    checker: ValidityChecker<S>,
    views: ViewDispatcher<S>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    agreements: Option<Arc<dyn AgreementSource>>,
}

impl<S: Store> AccessEngine<S> {
    /// Create a new engine over `store`, using the system clock.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self::assemble(Arc::new(store), Arc::new(SystemClock), config, None, None)
    }

    fn assemble(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
        fetcher: Option<Arc<dyn ContentFetcher>>,
        agreements: Option<Arc<dyn AgreementSource>>,
    ) -> Self {
        let mut views =
            ViewDispatcher::new(Arc::clone(&store), Arc::clone(&clock), config.fetch_timeout);
        if let Some(fetcher) = &fetcher {
            views.set_fetcher(Arc::clone(fetcher));
        }

        Self {
            ledger: GrantLedger::new(Arc::clone(&store), Arc::clone(&clock)),
            checker: ValidityChecker::new(Arc::clone(&store), Arc::clone(&clock)),
            views,
            store,
            clock,
            config,
            fetcher,
            agreements,
        }
    }

    /// Use `clock` as the source of time.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self::assemble(self.store, clock, self.config, self.fetcher, self.agreements)
    }

    /// Use `fetcher` to produce binary formats.
    pub fn with_fetcher(mut self, fetcher: impl ContentFetcher + 'static) -> Self {
        let fetcher: Arc<dyn ContentFetcher> = Arc::new(fetcher);
        self.views.set_fetcher(Arc::clone(&fetcher));
        self.fetcher = Some(fetcher);
        self
    }

    /// Look up work agreement deadlines in `agreements`.
    pub fn with_agreements(mut self, agreements: impl AgreementSource + 'static) -> Self {
        self.agreements = Some(Arc::new(agreements));
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Register content. The caller becomes its permanent owner.
    pub fn register_content(&self, registration: ContentRegistration) -> Result<ContentReference> {
        if registration.content_hash().is_empty() {
            return Err(CoreError::EmptyContentHash.into());
        }
        if registration.owner().is_empty() {
            return Err(CoreError::EmptyPrincipal.into());
        }

        let content = registration.build(self.clock.now_millis());
        if self.store.insert_content(&content)? == InsertResult::AlreadyExists {
            return Err(EngineError::ContentExists(content.content_hash));
        }

        tracing::info!(
            content_hash = %content.content_hash,
            owner = %content.owner,
            content_type = %content.content_type,
            network = %content.storage_network,
            "registered content"
        );
        Ok(content)
    }

    /// Get a content reference by hash.
    pub fn get_content(&self, content_hash: &ContentHash) -> Result<Option<ContentReference>> {
        Ok(self.store.get_content(content_hash)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grants
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `grantee` access to content owned by `grantor`.
    pub fn grant_access(
        &self,
        content_hash: &ContentHash,
        grantor: &PrincipalId,
        grantee: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
        max_views: Option<u32>,
    ) -> Result<AccessGrant> {
        Ok(self
            .ledger
            .issue(content_hash, grantor, grantee, duration, access_level, max_views)?)
    }

    /// Grant access shaped by a preset.
    pub fn grant_quick_access(
        &self,
        content_hash: &ContentHash,
        grantee: &PrincipalId,
        grantor: &PrincipalId,
        preset: QuickAccess,
    ) -> Result<AccessGrant> {
        Ok(self.ledger.issue_quick(content_hash, grantee, grantor, preset)?)
    }

    /// Grant the same access on several hashes. Partial success.
    pub fn batch_grant_access(
        &self,
        hashes: &[ContentHash],
        grantee: &PrincipalId,
        grantor: &PrincipalId,
        duration: AccessDuration,
        access_level: AccessLevel,
    ) -> BatchAccessGrant {
        self.ledger.issue_batch(hashes, grantee, grantor, duration, access_level)
    }

    /// Open a work-contract exchange between `client` and `worker`.
    pub fn grant_work_contract_access(
        &self,
        agreement_id: &AgreementId,
        client: &PrincipalId,
        worker: &PrincipalId,
        client_to_worker: &[ContentHash],
        worker_to_client: &[ContentHash],
    ) -> WorkContractAccessGrants {
        self.ledger.issue_for_work_contract(
            agreement_id,
            client,
            worker,
            client_to_worker,
            worker_to_client,
            self.config.work_contract_level,
            self.agreements.as_deref(),
        )
    }

    /// Grant a contract's pending deliverables once its agreement is verified.
    pub fn release_work_contract_deliverables(
        &self,
        contract: &WorkContractAccessGrants,
        event: &AgreementVerified,
    ) -> Result<BatchAccessGrant> {
        Ok(self
            .ledger
            .release_deliverables(contract, event, self.config.deliverable_level)?)
    }

    /// Revoke a grant. Idempotent.
    pub fn revoke_access(&self, grant_id: &GrantId, reason: Option<&str>) -> Result<AccessGrant> {
        Ok(self.ledger.revoke(grant_id, reason)?)
    }

    /// Overwrite a grant's expiry.
    pub fn extend_access(
        &self,
        grant_id: &GrantId,
        new_expiry: Option<i64>,
    ) -> Result<AccessGrant> {
        Ok(self.ledger.extend(grant_id, new_expiry)?)
    }

    /// Get a grant by ID.
    pub fn get_grant(&self, grant_id: &GrantId) -> Result<Option<AccessGrant>> {
        Ok(self.ledger.get(grant_id)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// The grant currently authorizing `requester`, if any.
    pub fn has_valid_access(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
    ) -> Result<Option<AccessGrant>> {
        Ok(self.checker.has_valid_access(content_hash, requester)?)
    }

    /// Check access, explaining any denial.
    pub fn check_access(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
    ) -> Result<AccessDecision> {
        Ok(self.checker.check(content_hash, requester)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    /// Serve content in `format`, consuming one view of the authorizing grant.
    ///
    /// Denials come back in the response; `Err` means the store failed.
    pub async fn handle_view_request(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
        format: OutputFormat,
    ) -> Result<ViewResponse> {
        self.views
            .dispatch(content_hash, requester, format, AccessType::View)
            .await
    }

    /// Render a structured preview without consuming a view.
    pub async fn generate_preview(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
        format: OutputFormat,
    ) -> Result<ViewResponse> {
        self.views
            .dispatch(content_hash, requester, format, AccessType::Preview)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audit and Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Access log of `content_hash`.
    ///
    /// Only the owner sees entries. Anyone else, including for unknown
    /// content, gets an empty list.
    pub fn get_access_logs(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
    ) -> Result<Vec<AuditLogEntry>> {
        match self.store.get_content(content_hash)? {
            Some(content) if &content.owner == requester => {
                Ok(self.store.audit_for(content_hash)?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Registry projection for `owner` at the current time.
    pub fn get_registry(&self, owner: &PrincipalId) -> Result<RegistryView> {
        RegistryView::collect(self.store.as_ref(), owner, self.clock.now_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentgate_core::{ContentType, ManualClock, StorageNetwork, HOUR_MS};
    use contentgate_grants::GrantError;
    use contentgate_store::MemoryStore;

    fn engine() -> (AccessEngine<MemoryStore>, Arc<ManualClock>) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let clock = Arc::new(ManualClock::new(0));
        let engine = AccessEngine::new(MemoryStore::new(), EngineConfig::default())
            .with_clock(clock.clone());
        (engine, clock)
    }

    fn register(engine: &AccessEngine<MemoryStore>, hash: &str, owner: &str) -> ContentReference {
        engine
            .register_content(ContentRegistration::new(
                hash,
                ContentType::Document,
                2_048,
                StorageNetwork::Arweave,
                owner,
            ))
            .unwrap()
    }

    #[test]
    fn test_register_content() {
        let (engine, clock) = engine();
        clock.set(42);
        let content = register(&engine, "H1", "alice");

        assert_eq!(content.registered_at, 42);
        assert_eq!(engine.get_content(&"H1".into()).unwrap(), Some(content));
    }

    #[test]
    fn test_register_rejects_duplicates_and_empty_ids() {
        let (engine, _) = engine();
        register(&engine, "H1", "alice");

        let dup = engine.register_content(ContentRegistration::new(
            "H1",
            ContentType::Image,
            1,
            StorageNetwork::Ipfs,
            "mallory",
        ));
        assert!(matches!(dup, Err(EngineError::ContentExists(_))));
        assert_eq!(
            engine.get_content(&"H1".into()).unwrap().unwrap().owner,
            PrincipalId::from("alice")
        );

        let empty = engine.register_content(ContentRegistration::new(
            "",
            ContentType::Image,
            1,
            StorageNetwork::Ipfs,
            "alice",
        ));
        assert!(matches!(empty, Err(EngineError::Core(CoreError::EmptyContentHash))));

        let ownerless = engine.register_content(ContentRegistration::new(
            "H2",
            ContentType::Image,
            1,
            StorageNetwork::Ipfs,
            "",
        ));
        assert!(matches!(ownerless, Err(EngineError::Core(CoreError::EmptyPrincipal))));
    }

    #[test]
    fn test_grant_requires_owner() {
        let (engine, _) = engine();
        register(&engine, "H1", "alice");

        let err = engine
            .grant_quick_access(
                &"H1".into(),
                &"bob".into(),
                &"mallory".into(),
                QuickAccess::DayPass,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Grant(GrantError::NotOwner { .. })));
    }

    #[test]
    fn test_revoke_and_extend_through_engine() {
        let (engine, clock) = engine();
        register(&engine, "H1", "alice");
        let grant = engine
            .grant_quick_access(
                &"H1".into(),
                &"bob".into(),
                &"alice".into(),
                QuickAccess::QuickView,
            )
            .unwrap();

        engine.extend_access(&grant.grant_id, Some(5 * HOUR_MS)).unwrap();
        clock.set(3 * HOUR_MS);
        assert!(engine.has_valid_access(&"H1".into(), &"bob".into()).unwrap().is_some());

        engine.revoke_access(&grant.grant_id, Some("leaked")).unwrap();
        assert!(engine.has_valid_access(&"H1".into(), &"bob".into()).unwrap().is_none());
        assert_eq!(
            engine.get_grant(&grant.grant_id).unwrap().unwrap().revocation_reason.as_deref(),
            Some("leaked")
        );
    }

    #[tokio::test]
    async fn test_logs_visible_to_owner_only() {
        let (engine, _) = engine();
        register(&engine, "H1", "alice");

        engine
            .handle_view_request(&"H1".into(), &"bob".into(), OutputFormat::Summary)
            .await
            .unwrap();
        engine
            .handle_view_request(&"H1".into(), &"alice".into(), OutputFormat::Summary)
            .await
            .unwrap();

        let logs = engine.get_access_logs(&"H1".into(), &"alice".into()).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(!logs[0].success);
        assert!(logs[1].success);

        assert!(engine.get_access_logs(&"H1".into(), &"bob".into()).unwrap().is_empty());
        assert!(engine.get_access_logs(&"H9".into(), &"alice".into()).unwrap().is_empty());
    }

    #[test]
    fn test_work_contract_uses_configured_levels() {
        struct Deadline;
        impl AgreementSource for Deadline {
            fn completion_deadline(&self, _: &AgreementId) -> Option<i64> {
                Some(10 * HOUR_MS)
            }
        }

        let (engine, _) = engine();
        let engine = engine.with_agreements(Deadline);
        register(&engine, "H1", "alice");
        register(&engine, "W1", "bob");

        let contract = engine.grant_work_contract_access(
            &"agr-7".into(),
            &"alice".into(),
            &"bob".into(),
            &["H1".into()],
            &["W1".into()],
        );
        let issued = &contract.granted.grants[0];
        assert_eq!(issued.access_level, AccessLevel::Download);
        assert_eq!(issued.expires_at, Some(10 * HOUR_MS));

        let released = engine
            .release_work_contract_deliverables(
                &contract,
                &AgreementVerified {
                    agreement_id: "agr-7".into(),
                    verified_at: HOUR_MS,
                },
            )
            .unwrap();
        assert!(released.is_complete());
        assert!(engine.has_valid_access(&"W1".into(), &"alice".into()).unwrap().is_some());
    }
}
