//! Engine configuration.

use std::time::Duration;

use contentgate_core::AccessLevel;

/// Configuration for the [`AccessEngine`](crate::AccessEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on one call to the content fetcher.
    pub fetch_timeout: Duration,
    /// Level of client to worker grants in a work-contract exchange.
    pub work_contract_level: AccessLevel,
    /// Level of worker to client grants released after verification.
    pub deliverable_level: AccessLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            work_contract_level: AccessLevel::Download,
            deliverable_level: AccessLevel::Download,
        }
    }
}
