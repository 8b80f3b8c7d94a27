//! Quick access presets.

use contentgate_core::{AccessDuration, AccessLevel};

/// Common grant shapes, so callers do not have to pick every parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAccess {
    /// One hour, view only.
    QuickView,
    /// 24 hours, view only.
    DayPass,
    /// Seven days, view only.
    WeekAccess,
    /// Thirty days, with download.
    MonthAccess,
    /// A single view within 24 hours.
    SingleView,
}

impl QuickAccess {
    /// Duration of grants issued with this preset.
    pub fn duration(self) -> AccessDuration {
        match self {
            QuickAccess::QuickView => AccessDuration::QUICK_VIEW,
            QuickAccess::DayPass => AccessDuration::DAY_PASS,
            QuickAccess::WeekAccess => AccessDuration::WEEK_ACCESS,
            QuickAccess::MonthAccess => AccessDuration::MONTH_ACCESS,
            QuickAccess::SingleView => AccessDuration::SingleView,
        }
    }

    /// Access level of grants issued with this preset.
    pub fn access_level(self) -> AccessLevel {
        match self {
            QuickAccess::MonthAccess => AccessLevel::Download,
            _ => AccessLevel::ViewOnly,
        }
    }

    /// View cap of grants issued with this preset.
    pub fn max_views(self) -> Option<u32> {
        match self {
            QuickAccess::SingleView => Some(1),
            _ => None,
        }
    }
}
