//! Expiry vectors.
//!
//! Known (duration, issue time) pairs with their expected expiry. Any
//! implementation of the expiry rules must reproduce these exactly.

use contentgate_core::{resolve_expiry, AccessDuration, DaySpan, HourSpan};

use crate::fixtures::EPOCH;

/// An expiry test vector.
#[derive(Debug, Clone)]
pub struct ExpiryVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub duration: AccessDuration,
    /// Issue time, Unix milliseconds.
    pub issued_at: i64,
    /// Expected expiry; `None` never expires.
    pub expected: Option<i64>,
}

/// Get all expiry vectors.
pub fn all_vectors() -> Vec<ExpiryVector> {
    vec![
        ExpiryVector {
            name: "quick view",
            duration: AccessDuration::Hours(HourSpan::One),
            issued_at: EPOCH,
            expected: Some(1_736_874_000_000),
        },
        ExpiryVector {
            name: "day pass",
            duration: AccessDuration::Hours(HourSpan::TwentyFour),
            issued_at: EPOCH,
            expected: Some(1_736_956_800_000),
        },
        ExpiryVector {
            name: "twelve hours from zero",
            duration: AccessDuration::Hours(HourSpan::Twelve),
            issued_at: 0,
            expected: Some(43_200_000),
        },
        ExpiryVector {
            name: "three days",
            duration: AccessDuration::Days(DaySpan::Three),
            issued_at: EPOCH,
            expected: Some(1_737_129_600_000),
        },
        ExpiryVector {
            name: "month access",
            duration: AccessDuration::Days(DaySpan::Thirty),
            issued_at: EPOCH,
            expected: Some(1_739_462_400_000),
        },
        ExpiryVector {
            name: "single view backstop",
            duration: AccessDuration::SingleView,
            issued_at: EPOCH,
            expected: Some(1_736_956_800_000),
        },
        ExpiryVector {
            name: "permanent",
            duration: AccessDuration::Permanent,
            issued_at: EPOCH,
            expected: None,
        },
        ExpiryVector {
            name: "work contract is open until bound",
            duration: AccessDuration::WorkContract("agr-1".into()),
            issued_at: EPOCH,
            expected: None,
        },
        ExpiryVector {
            name: "custom expiry verbatim",
            duration: AccessDuration::Custom(1_800_000_000_000),
            issued_at: EPOCH,
            expected: Some(1_800_000_000_000),
        },
        ExpiryVector {
            name: "custom expiry in the past",
            duration: AccessDuration::Custom(5),
            issued_at: EPOCH,
            expected: Some(5),
        },
    ]
}

/// Check every vector, returning (name, passed, actual).
pub fn verify_all_vectors() -> Vec<(&'static str, bool, Option<i64>)> {
    all_vectors()
        .into_iter()
        .map(|v| {
            let actual = resolve_expiry(&v.duration, v.issued_at);
            (v.name, actual == v.expected, actual)
        })
        .collect()
}
