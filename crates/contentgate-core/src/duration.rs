//! Access durations and expiry resolution.
//!
//! A grant's lifetime is chosen from a closed set of durations. The expiry is
//! resolved exactly once, at issuance, by [`resolve_expiry`].

use serde::{Deserialize, Serialize};

use crate::types::AgreementId;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Allowed hour-based lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HourSpan {
    One,
    Two,
    Four,
    Eight,
    Twelve,
    TwentyFour,
}

impl HourSpan {
    /// Every allowed span, shortest first.
    pub const ALL: [HourSpan; 6] = [
        HourSpan::One,
        HourSpan::Two,
        HourSpan::Four,
        HourSpan::Eight,
        HourSpan::Twelve,
        HourSpan::TwentyFour,
    ];

    /// Number of hours.
    pub const fn hours(self) -> i64 {
        match self {
            HourSpan::One => 1,
            HourSpan::Two => 2,
            HourSpan::Four => 4,
            HourSpan::Eight => 8,
            HourSpan::Twelve => 12,
            HourSpan::TwentyFour => 24,
        }
    }
}

/// Allowed day-based lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaySpan {
    One,
    Three,
    Seven,
    Fourteen,
    Thirty,
}

impl DaySpan {
    /// Every allowed span, shortest first.
    pub const ALL: [DaySpan; 5] = [
        DaySpan::One,
        DaySpan::Three,
        DaySpan::Seven,
        DaySpan::Fourteen,
        DaySpan::Thirty,
    ];

    /// Number of days.
    pub const fn days(self) -> i64 {
        match self {
            DaySpan::One => 1,
            DaySpan::Three => 3,
            DaySpan::Seven => 7,
            DaySpan::Fourteen => 14,
            DaySpan::Thirty => 30,
        }
    }
}

/// How long a grant lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessDuration {
    Hours(HourSpan),
    Days(DaySpan),
    /// Tied to an external agreement. The issuer binds the deadline.
    WorkContract(AgreementId),
    Permanent,
    /// One view, with a 24 hour backstop.
    SingleView,
    /// Absolute expiry in Unix milliseconds.
    Custom(i64),
}

impl AccessDuration {
    pub const QUICK_VIEW: Self = AccessDuration::Hours(HourSpan::One);
    pub const DAY_PASS: Self = AccessDuration::Hours(HourSpan::TwentyFour);
    pub const WEEK_ACCESS: Self = AccessDuration::Days(DaySpan::Seven);
    pub const MONTH_ACCESS: Self = AccessDuration::Days(DaySpan::Thirty);

    /// Lifetime after which an unconsumed single-view grant lapses.
    pub const SINGLE_VIEW_BACKSTOP_MS: i64 = DAY_MS;

    /// Whether this duration is gated by a single view.
    pub fn is_single_view(&self) -> bool {
        matches!(self, AccessDuration::SingleView)
    }
}

/// Resolve a duration issued at `issued_at` to an absolute expiry.
///
/// `None` means the grant never expires on its own. Custom expiries are
/// returned verbatim, even if they lie before `issued_at`.
pub fn resolve_expiry(duration: &AccessDuration, issued_at: i64) -> Option<i64> {
    match duration {
        AccessDuration::Hours(span) => Some(issued_at.saturating_add(span.hours() * HOUR_MS)),
        AccessDuration::Days(span) => Some(issued_at.saturating_add(span.days() * DAY_MS)),
        AccessDuration::WorkContract(_) => None,
        AccessDuration::Permanent => None,
        AccessDuration::SingleView => {
            Some(issued_at.saturating_add(AccessDuration::SINGLE_VIEW_BACKSTOP_MS))
        }
        AccessDuration::Custom(expiry) => Some(*expiry),
    }
}
