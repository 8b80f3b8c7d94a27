//! View dispatch: authorize, render, count and audit one request.
//!
//! A request moves through `exists → authorized → supported → generated →
//! committed`. Any step may end in a [`ViewDenial`]; every outcome, served
//! or denied, appends exactly one audit entry.
//!
//! Output is generated before the view is counted. The count is committed
//! through [`GrantStore::record_view`], which re-checks the grant under the
//! store's write lock, so a dropped request future never consumes a view and
//! concurrent viewers cannot overrun a cap. A grant that lapses during
//! generation is replaced by the requester's next usable grant.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use contentgate_core::{
    AccessGrant, AccessLevel, AccessType, AuditLogEntry, Clock, ContentHash, ContentReference,
    GrantStatus, OutputFormat, PrincipalId,
};
use contentgate_grants::{AccessDecision, DenialReason, ValidityChecker};
use contentgate_store::{AuditStore, ContentStore, GrantStore, RecordedView, Store};

use crate::error::Result;
use crate::fetch::{ContentFetcher, FetchError};
use crate::render::render;

/// Why a view or preview request was not served.
///
/// The `Display` text is what the audit log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ViewDenial {
    #[error("content not found")]
    ContentNotFound,

    /// The requester holds no grant and is not the owner.
    #[error("no access grant")]
    NoAccess,

    #[error("access grant expired")]
    Expired,

    #[error("access grant revoked")]
    Revoked,

    #[error("view limit reached")]
    ViewLimitReached,

    #[error("content could not be decrypted")]
    DecryptionFailed,

    #[error("format not supported for this content")]
    FormatNotSupported,

    /// The storage collaborator failed or timed out.
    #[error("content unavailable")]
    ContentUnavailable,
}

impl From<DenialReason> for ViewDenial {
    fn from(reason: DenialReason) -> Self {
        match reason {
            DenialReason::NoGrant => ViewDenial::NoAccess,
            DenialReason::Revoked => ViewDenial::Revoked,
            DenialReason::Expired => ViewDenial::Expired,
            DenialReason::ViewLimitReached => ViewDenial::ViewLimitReached,
        }
    }
}

impl From<GrantStatus> for ViewDenial {
    fn from(status: GrantStatus) -> Self {
        match status {
            GrantStatus::Revoked => ViewDenial::Revoked,
            GrantStatus::Expired => ViewDenial::Expired,
            GrantStatus::Exhausted => ViewDenial::ViewLimitReached,
            GrantStatus::Active => ViewDenial::NoAccess,
        }
    }
}

/// Generated output of a served request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContent {
    /// A structured rendering of the metadata.
    Text { format: OutputFormat, body: String },

    /// Bytes produced by the content fetcher.
    Binary { mime_type: &'static str, bytes: Bytes },

    /// Stands in for binary output when no fetcher is configured.
    Placeholder { format: OutputFormat, locator: String },
}

impl ViewContent {
    /// The text body, for structured output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ViewContent::Text { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Outcome of a view or preview request.
///
/// Denials are reported here with `access_valid == false`, never as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewResponse {
    pub access_valid: bool,
    pub content_hash: ContentHash,
    pub format: OutputFormat,
    pub content: Option<ViewContent>,
    /// Level of the authorizing grant.
    pub access_level: Option<AccessLevel>,
    pub access_expires_at: Option<i64>,
    /// `None` for uncapped grants.
    pub remaining_views: Option<u32>,
    pub error: Option<ViewDenial>,
}

impl ViewResponse {
    fn served(
        content_hash: &ContentHash,
        format: OutputFormat,
        content: ViewContent,
        grant: &AccessGrant,
    ) -> Self {
        Self {
            access_valid: true,
            content_hash: content_hash.clone(),
            format,
            content: Some(content),
            access_level: Some(grant.access_level),
            access_expires_at: grant.expires_at,
            remaining_views: grant.remaining_views(),
            error: None,
        }
    }

    fn denied(content_hash: &ContentHash, format: OutputFormat, denial: ViewDenial) -> Self {
        Self {
            access_valid: false,
            content_hash: content_hash.clone(),
            format,
            content: None,
            access_level: None,
            access_expires_at: None,
            remaining_views: None,
            error: Some(denial),
        }
    }
}

/// Serves view and preview requests against a store.
pub struct ViewDispatcher<S> {
    store: Arc<S>,
    checker: ValidityChecker<S>,
    clock: Arc<dyn Clock>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    fetch_timeout: Duration,
}

impl<S: Store> ViewDispatcher<S> {
    /// Create a dispatcher with no fetcher configured.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, fetch_timeout: Duration) -> Self {
        Self {
            checker: ValidityChecker::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            clock,
            fetcher: None,
            fetch_timeout,
        }
    }

    /// Use `fetcher` for binary formats.
    pub fn set_fetcher(&mut self, fetcher: Arc<dyn ContentFetcher>) {
        self.fetcher = Some(fetcher);
    }

    /// Handle one request.
    ///
    /// `AccessType::View` consumes a view from the authorizing grant.
    /// `AccessType::Preview` never does, and only accepts structured formats.
    ///
    /// A store failure is returned as an error after a best-effort audit
    /// entry recording it.
    pub async fn dispatch(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
        format: OutputFormat,
        access_type: AccessType,
    ) -> Result<ViewResponse> {
        let outcome = self.serve(content_hash, requester, format, access_type).await;
        let now = self.clock.now_millis();

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                let entry = AuditLogEntry::denied(
                    content_hash.clone(),
                    requester.clone(),
                    access_type,
                    format,
                    now,
                    err.to_string(),
                );
                if let Err(audit_err) = self.store.append_audit(&entry) {
                    tracing::warn!(
                        content_hash = %content_hash,
                        error = %audit_err,
                        "failed request could not be audited"
                    );
                }
                return Err(err);
            }
        };

        let (entry, response) = match outcome {
            Ok((content, grant)) => {
                tracing::debug!(
                    content_hash = %content_hash,
                    requester = %requester,
                    %format,
                    owner = grant.is_owner_grant(),
                    "served view"
                );
                (
                    AuditLogEntry::served(
                        content_hash.clone(),
                        requester.clone(),
                        access_type,
                        format,
                        now,
                    ),
                    ViewResponse::served(content_hash, format, content, &grant),
                )
            }
            Err(denial) => {
                tracing::debug!(
                    content_hash = %content_hash,
                    requester = %requester,
                    %format,
                    %denial,
                    "denied view"
                );
                (
                    AuditLogEntry::denied(
                        content_hash.clone(),
                        requester.clone(),
                        access_type,
                        format,
                        now,
                        denial.to_string(),
                    ),
                    ViewResponse::denied(content_hash, format, denial),
                )
            }
        };

        self.store.append_audit(&entry)?;
        Ok(response)
    }

    async fn serve(
        &self,
        content_hash: &ContentHash,
        requester: &PrincipalId,
        format: OutputFormat,
        access_type: AccessType,
    ) -> Result<std::result::Result<(ViewContent, AccessGrant), ViewDenial>> {
        let Some(content) = self.store.get_content(content_hash)? else {
            return Ok(Err(ViewDenial::ContentNotFound));
        };

        let grant = match self
            .checker
            .check_content(&content, requester, self.clock.now_millis())?
        {
            AccessDecision::Granted(grant) => grant,
            AccessDecision::Denied(reason) => return Ok(Err(reason.into())),
            AccessDecision::ContentNotFound => return Ok(Err(ViewDenial::ContentNotFound)),
        };

        let previewable = access_type == AccessType::View || format.is_structured();
        if !previewable || !format.supports(&content.content_type) {
            return Ok(Err(ViewDenial::FormatNotSupported));
        }

        let generated = match self.generate(&content, format).await {
            Ok(generated) => generated,
            Err(denial) => return Ok(Err(denial)),
        };

        if access_type == AccessType::Preview || grant.is_owner_grant() {
            return Ok(Ok((generated, grant)));
        }

        Ok(self
            .commit_view(&content, requester, grant)?
            .map(|counted| (generated, counted)))
    }

    /// Count one view against `grant`.
    ///
    /// If `grant` stopped being usable while the output was generated, the
    /// requester's grants are re-checked at commit time and the view is
    /// counted against the next usable one. Falling back to the owner grant
    /// counts nothing.
    fn commit_view(
        &self,
        content: &ContentReference,
        requester: &PrincipalId,
        mut grant: AccessGrant,
    ) -> Result<std::result::Result<AccessGrant, ViewDenial>> {
        loop {
            let now = self.clock.now_millis();
            let refused = match self.store.record_view(&grant.grant_id, now)? {
                RecordedView::Recorded(counted) => return Ok(Ok(counted)),
                RecordedView::Unusable(status) => ViewDenial::from(status),
                RecordedView::NotFound => ViewDenial::NoAccess,
            };
            tracing::debug!(
                content_hash = %content.content_hash,
                requester = %requester,
                grant_id = %grant.grant_id,
                %refused,
                "grant unusable at commit, reselecting"
            );

            grant = match self.checker.check_content(content, requester, now)? {
                AccessDecision::Granted(next) if next.is_owner_grant() => return Ok(Ok(next)),
                AccessDecision::Granted(next) if next.grant_id != grant.grant_id => next,
                AccessDecision::Granted(_) => return Ok(Err(refused)),
                AccessDecision::Denied(reason) => return Ok(Err(reason.into())),
                AccessDecision::ContentNotFound => return Ok(Err(ViewDenial::ContentNotFound)),
            };
        }
    }

    async fn generate(
        &self,
        content: &ContentReference,
        format: OutputFormat,
    ) -> std::result::Result<ViewContent, ViewDenial> {
        if format.is_structured() {
            return render(content, format)
                .map(|body| ViewContent::Text { format, body })
                .map_err(|err| {
                    tracing::warn!(
                        content_hash = %content.content_hash,
                        error = %err,
                        "render failed"
                    );
                    ViewDenial::ContentUnavailable
                });
        }

        let Some(fetcher) = &self.fetcher else {
            return Ok(ViewContent::Placeholder {
                format,
                locator: content.locator(),
            });
        };

        match tokio::time::timeout(self.fetch_timeout, fetcher.fetch(content, format)).await {
            Ok(Ok(bytes)) => Ok(ViewContent::Binary {
                mime_type: format.mime_type(),
                bytes,
            }),
            Ok(Err(FetchError::Decryption(reason))) => {
                tracing::warn!(content_hash = %content.content_hash, %reason, "decryption failed");
                Err(ViewDenial::DecryptionFailed)
            }
            Ok(Err(err)) => {
                tracing::warn!(content_hash = %content.content_hash, error = %err, "fetch failed");
                Err(ViewDenial::ContentUnavailable)
            }
            Err(_) => {
                tracing::warn!(
                    content_hash = %content.content_hash,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "fetch timed out"
                );
                Err(ViewDenial::ContentUnavailable)
            }
        }
    }
}
