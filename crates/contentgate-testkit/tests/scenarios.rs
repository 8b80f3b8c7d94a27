//! End-to-end access scenarios against a memory-backed engine.

use std::sync::Arc;
use std::time::Duration;

use contentgate::{
    ContentKey, DecryptingFetcher, EncryptedObject, EngineConfig, KeyRing, ViewContent, ViewDenial,
};
use contentgate_core::{
    AccessDuration, AccessLevel, AccessType, ContentHash, ContentRegistration, ContentType,
    EncryptionType, OutputFormat, PrincipalId, StorageNetwork, HOUR_MS,
};
use contentgate_grants::{AccessDecision, AgreementVerified, DenialReason, QuickAccess};
use contentgate_store::GrantStore;
use contentgate_testkit::{
    init_tracing, Failure, FailingFetcher, SlowFetcher, StaticFetcher, TestFixture,
};

fn h(s: &str) -> ContentHash {
    ContentHash::from(s)
}

fn p(s: &str) -> PrincipalId {
    PrincipalId::from(s)
}

#[tokio::test]
async fn day_pass_expires_after_24_hours() {
    init_tracing();
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    let start = fixture.now();

    let grant = fixture
        .engine
        .grant_quick_access(&h("H1"), &p("bob"), &p("alice"), QuickAccess::DayPass)
        .unwrap();
    assert_eq!(grant.expires_at, Some(start + 24 * HOUR_MS));

    fixture.advance(HOUR_MS);
    let served = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Summary)
        .await
        .unwrap();
    assert!(served.access_valid);
    assert_eq!(
        served.content.as_ref().and_then(ViewContent::as_text),
        Some("Image of 500.0 KB stored on IPFS, unencrypted, owned by alice.")
    );
    assert_eq!(served.access_expires_at, grant.expires_at);
    assert_eq!(served.remaining_views, None);

    fixture.advance(24 * HOUR_MS);
    let denied = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Summary)
        .await
        .unwrap();
    assert!(!denied.access_valid);
    assert_eq!(denied.error, Some(ViewDenial::Expired));
    assert!(denied.content.is_none());

    let logs = fixture.engine.get_access_logs(&h("H1"), &p("alice")).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].error.as_deref(), Some("access grant expired"));
}

#[tokio::test]
async fn batch_grants_show_up_in_registry() {
    let fixture = TestFixture::new();
    for hash in ["H1", "H2", "H3"] {
        fixture.register(hash, ContentType::Document, "alice");
    }

    let batch = fixture.engine.batch_grant_access(
        &[h("H1"), h("H2"), h("H3")],
        &p("bob"),
        &p("alice"),
        AccessDuration::WEEK_ACCESS,
        AccessLevel::ViewOnly,
    );
    assert!(batch.is_complete());
    assert_eq!(batch.grants.len(), 3);

    let registry = fixture.engine.get_registry(&p("bob")).unwrap();
    let mut received: Vec<_> = registry
        .received_grants
        .iter()
        .map(|g| g.content_hash.as_str().to_string())
        .collect();
    received.sort();
    assert_eq!(received, ["H1", "H2", "H3"]);
    assert!(registry.owned_content.is_empty());

    let alice = fixture.engine.get_registry(&p("alice")).unwrap();
    assert_eq!(alice.owned_content.len(), 3);
    assert_eq!(alice.granted_access.len(), 3);
    assert_eq!(alice.total_views, 0);
}

#[tokio::test]
async fn single_view_cap_is_enforced() {
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    let grant = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("bob"),
            AccessDuration::WEEK_ACCESS,
            AccessLevel::ViewOnly,
            Some(1),
        )
        .unwrap();

    let first = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Json)
        .await
        .unwrap();
    assert!(first.access_valid);
    assert_eq!(first.remaining_views, Some(0));
    assert_eq!(
        fixture.engine.get_grant(&grant.grant_id).unwrap().unwrap().view_count,
        1
    );

    let second = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Json)
        .await
        .unwrap();
    assert!(!second.access_valid);
    assert_eq!(second.error, Some(ViewDenial::ViewLimitReached));
    assert_eq!(
        fixture.engine.check_access(&h("H1"), &p("bob")).unwrap(),
        AccessDecision::Denied(DenialReason::ViewLimitReached)
    );
}

#[tokio::test]
async fn owner_always_has_access() {
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    fixture.advance(10_000 * HOUR_MS);

    for _ in 0..5 {
        let response = fixture
            .engine
            .handle_view_request(&h("H1"), &p("alice"), OutputFormat::Markdown)
            .await
            .unwrap();
        assert!(response.access_valid);
        assert_eq!(response.access_level, Some(AccessLevel::Full));
        assert_eq!(response.access_expires_at, None);
    }

    assert!(fixture.engine.store().grants_on(&h("H1")).unwrap().is_empty());
    assert_eq!(fixture.engine.get_registry(&p("alice")).unwrap().total_views, 0);
}

#[tokio::test]
async fn non_owner_never_sees_logs() {
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    fixture
        .engine
        .grant_quick_access(&h("H1"), &p("bob"), &p("alice"), QuickAccess::WeekAccess)
        .unwrap();

    for who in ["bob", "mallory", "alice"] {
        fixture
            .engine
            .handle_view_request(&h("H1"), &p(who), OutputFormat::PlainText)
            .await
            .unwrap();
    }

    assert_eq!(fixture.engine.get_access_logs(&h("H1"), &p("alice")).unwrap().len(), 3);
    assert!(fixture.engine.get_access_logs(&h("H1"), &p("bob")).unwrap().is_empty());
    assert!(fixture.engine.get_access_logs(&h("H1"), &p("mallory")).unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_views_respect_cap() {
    let fixture = Arc::new(TestFixture::new());
    fixture.register_image("H1", "alice");
    let grant = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("bob"),
            AccessDuration::Permanent,
            AccessLevel::ViewOnly,
            Some(5),
        )
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let fixture = Arc::clone(&fixture);
        tasks.push(tokio::spawn(async move {
            fixture
                .engine
                .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Summary)
                .await
                .unwrap()
                .access_valid
        }));
    }

    let mut served = 0;
    for task in tasks {
        if task.await.unwrap() {
            served += 1;
        }
    }

    assert_eq!(served, 5);
    assert_eq!(
        fixture.engine.get_grant(&grant.grant_id).unwrap().unwrap().view_count,
        5
    );
    assert_eq!(fixture.engine.get_access_logs(&h("H1"), &p("alice")).unwrap().len(), 32);
}

#[tokio::test]
async fn binary_formats_go_through_fetcher() {
    let fixture =
        TestFixture::new().with_fetcher(StaticFetcher::new().with("H1", &b"\x89PNG"[..]));
    fixture.register_image("H1", "alice");
    fixture.register("A1", ContentType::Audio, "alice");

    let png = fixture
        .engine
        .handle_view_request(&h("H1"), &p("alice"), OutputFormat::Png)
        .await
        .unwrap();
    assert_eq!(
        png.content,
        Some(ViewContent::Binary {
            mime_type: "image/png",
            bytes: bytes::Bytes::from_static(b"\x89PNG"),
        })
    );

    let pdf = fixture
        .engine
        .handle_view_request(&h("A1"), &p("alice"), OutputFormat::Pdf)
        .await
        .unwrap();
    assert_eq!(pdf.error, Some(ViewDenial::FormatNotSupported));
}

#[tokio::test]
async fn fetch_failures_are_denials() {
    for (failure, expected) in [
        (Failure::Decryption, ViewDenial::DecryptionFailed),
        (Failure::Backend, ViewDenial::ContentUnavailable),
        (Failure::Stall(Duration::from_secs(5)), ViewDenial::ContentUnavailable),
    ] {
        let config = EngineConfig {
            fetch_timeout: Duration::from_millis(50),
            ..EngineConfig::default()
        };
        let fixture = TestFixture::with_config(config).with_fetcher(FailingFetcher(failure));
        fixture.register_image("H1", "alice");
        let grant = fixture
            .engine
            .grant_quick_access(&h("H1"), &p("bob"), &p("alice"), QuickAccess::SingleView)
            .unwrap();

        let response = fixture
            .engine
            .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Jpeg)
            .await
            .unwrap();
        assert_eq!(response.error, Some(expected));

        // The single view is still available.
        assert_eq!(
            fixture.engine.get_grant(&grant.grant_id).unwrap().unwrap().view_count,
            0
        );
    }
}

#[tokio::test]
async fn encrypted_content_is_decrypted_for_viewers() {
    let key = ContentKey::generate();
    let sealed = EncryptedObject::seal(b"scan", &key).unwrap().to_bytes().unwrap();

    let keys = KeyRing::new();
    keys.insert(h("E1"), key);
    let fetcher = DecryptingFetcher::new(StaticFetcher::new().with("E1", sealed), keys);

    let fixture = TestFixture::new().with_fetcher(fetcher);
    fixture.register_with(
        ContentRegistration::new("E1", ContentType::Medical, 4, StorageNetwork::Private, "alice")
            .encrypted(EncryptionType::ChaCha20Poly1305),
    );
    fixture
        .engine
        .grant_quick_access(&h("E1"), &p("bob"), &p("alice"), QuickAccess::MonthAccess)
        .unwrap();

    let response = fixture
        .engine
        .handle_view_request(&h("E1"), &p("bob"), OutputFormat::Pdf)
        .await
        .unwrap();
    match response.content {
        Some(ViewContent::Binary { bytes, mime_type }) => {
            assert_eq!(&bytes[..], b"scan");
            assert_eq!(mime_type, "application/pdf");
        }
        other => panic!("unexpected content: {other:?}"),
    }
    assert_eq!(response.access_level, Some(AccessLevel::Download));
}

#[tokio::test]
async fn grant_lapsing_mid_fetch_falls_back_to_remaining_access() {
    init_tracing();
    let fixture = TestFixture::new();
    let clock = fixture.clock.clone();
    let fixture = fixture.with_fetcher(SlowFetcher::new(clock, 2 * HOUR_MS, "png"));
    fixture.register_image("H1", "alice");

    // The owner's own short grant expires during the fetch.
    let own = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("alice"),
            AccessDuration::QUICK_VIEW,
            AccessLevel::Full,
            Some(2),
        )
        .unwrap();
    let owner = fixture
        .engine
        .handle_view_request(&h("H1"), &p("alice"), OutputFormat::Png)
        .await
        .unwrap();
    assert!(owner.access_valid, "{owner:?}");
    assert_eq!(owner.access_level, Some(AccessLevel::Full));
    assert_eq!(owner.remaining_views, None);
    assert_eq!(fixture.engine.get_grant(&own.grant_id).unwrap().unwrap().view_count, 0);

    // Bob's best grant expires during the fetch; his permanent one remains.
    let quick = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("bob"),
            AccessDuration::QUICK_VIEW,
            AccessLevel::Full,
            None,
        )
        .unwrap();
    let lasting = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("bob"),
            AccessDuration::Permanent,
            AccessLevel::ViewOnly,
            None,
        )
        .unwrap();
    let bob = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Png)
        .await
        .unwrap();
    assert!(bob.access_valid, "{bob:?}");
    assert_eq!(bob.access_level, Some(AccessLevel::ViewOnly));
    assert_eq!(bob.access_expires_at, None);
    assert_eq!(fixture.engine.get_grant(&quick.grant_id).unwrap().unwrap().view_count, 0);
    assert_eq!(fixture.engine.get_grant(&lasting.grant_id).unwrap().unwrap().view_count, 1);
    assert_eq!(
        fixture.engine.has_valid_access(&h("H1"), &p("bob")).unwrap().map(|g| g.access_level),
        Some(AccessLevel::ViewOnly)
    );
}

#[tokio::test]
async fn preview_does_not_consume_single_view() {
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    fixture
        .engine
        .grant_quick_access(&h("H1"), &p("bob"), &p("alice"), QuickAccess::SingleView)
        .unwrap();

    for _ in 0..3 {
        let preview = fixture
            .engine
            .generate_preview(&h("H1"), &p("bob"), OutputFormat::Summary)
            .await
            .unwrap();
        assert!(preview.access_valid);
        assert_eq!(preview.remaining_views, Some(1));
    }

    let view = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Summary)
        .await
        .unwrap();
    assert!(view.access_valid);

    let logs = fixture.engine.get_access_logs(&h("H1"), &p("alice")).unwrap();
    assert_eq!(
        logs.iter().map(|e| e.access_type).collect::<Vec<_>>(),
        [
            AccessType::Preview,
            AccessType::Preview,
            AccessType::Preview,
            AccessType::View
        ]
    );
}

#[tokio::test]
async fn revoked_grant_is_denied_with_reason() {
    let fixture = TestFixture::new();
    fixture.register_image("H1", "alice");
    let grant = fixture
        .engine
        .grant_access(
            &h("H1"),
            &p("alice"),
            &p("bob"),
            AccessDuration::Permanent,
            AccessLevel::Share,
            None,
        )
        .unwrap();
    fixture.engine.revoke_access(&grant.grant_id, Some("dispute")).unwrap();
    fixture.advance(HOUR_MS);

    let response = fixture
        .engine
        .handle_view_request(&h("H1"), &p("bob"), OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(response.error, Some(ViewDenial::Revoked));

    let unknown = fixture
        .engine
        .handle_view_request(&h("nope"), &p("bob"), OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(unknown.error, Some(ViewDenial::ContentNotFound));
}

#[test]
fn work_contract_exchange() {
    init_tracing();
    let fixture = TestFixture::new();
    fixture.register("BRIEF", ContentType::Document, "client");
    fixture.register("DRAFT", ContentType::Document, "worker");

    let contract = fixture.engine.grant_work_contract_access(
        &"agr-42".into(),
        &p("client"),
        &p("worker"),
        &[h("BRIEF")],
        &[h("DRAFT")],
    );
    assert!(fixture.engine.has_valid_access(&h("BRIEF"), &p("worker")).unwrap().is_some());
    assert!(fixture.engine.has_valid_access(&h("DRAFT"), &p("client")).unwrap().is_none());
    assert_eq!(contract.pending.len(), 1);

    let released = fixture
        .engine
        .release_work_contract_deliverables(
            &contract,
            &AgreementVerified {
                agreement_id: "agr-42".into(),
                verified_at: fixture.now(),
            },
        )
        .unwrap();
    assert_eq!(released.grants.len(), 1);
    assert!(fixture.engine.has_valid_access(&h("DRAFT"), &p("client")).unwrap().is_some());
}
