//! Proptest generators for property-based testing.

use proptest::prelude::*;

use contentgate_core::{
    AccessDuration, AccessLevel, AgreementId, ContentHash, ContentType, DaySpan, HourSpan,
    PrincipalId, StorageNetwork,
};

/// Generate an hour span.
pub fn hour_span() -> impl Strategy<Value = HourSpan> {
    proptest::sample::select(HourSpan::ALL.to_vec())
}

/// Generate a day span.
pub fn day_span() -> impl Strategy<Value = DaySpan> {
    proptest::sample::select(DaySpan::ALL.to_vec())
}

/// Generate any access duration.
pub fn access_duration() -> impl Strategy<Value = AccessDuration> {
    prop_oneof![
        hour_span().prop_map(AccessDuration::Hours),
        day_span().prop_map(AccessDuration::Days),
        "agr-[0-9]{1,4}".prop_map(|id| AccessDuration::WorkContract(AgreementId(id))),
        Just(AccessDuration::Permanent),
        Just(AccessDuration::SingleView),
        timestamp().prop_map(AccessDuration::Custom),
    ]
}

/// Generate an access level.
pub fn access_level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::ViewOnly),
        Just(AccessLevel::Download),
        Just(AccessLevel::Share),
        Just(AccessLevel::Full),
    ]
}

/// Generate a content type, including custom ones.
pub fn content_type() -> impl Strategy<Value = ContentType> {
    prop_oneof![
        Just(ContentType::Document),
        Just(ContentType::Image),
        Just(ContentType::Video),
        Just(ContentType::Audio),
        Just(ContentType::Data),
        Just(ContentType::Model3D),
        Just(ContentType::Certificate),
        Just(ContentType::Evidence),
        Just(ContentType::Medical),
        Just(ContentType::Financial),
        Just(ContentType::Legal),
        Just(ContentType::Identity),
        "[A-Z][a-z]{2,10}".prop_map(ContentType::Custom),
    ]
}

/// Generate a storage network.
pub fn storage_network() -> impl Strategy<Value = StorageNetwork> {
    prop_oneof![
        Just(StorageNetwork::Ipfs),
        Just(StorageNetwork::Arweave),
        Just(StorageNetwork::Filecoin),
        Just(StorageNetwork::Private),
    ]
}

/// Generate a content hash shaped like an IPFS CID.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    "Qm[1-9A-HJ-NP-Za-km-z]{44}".prop_map(ContentHash::from)
}

/// Generate a principal name.
pub fn principal() -> impl Strategy<Value = PrincipalId> {
    "[a-z][a-z0-9]{0,15}".prop_map(PrincipalId::from)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800_000i64
}
