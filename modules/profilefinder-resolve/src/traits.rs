// Trait seams for the resolver's collaborators.
//
// PageSource: page-content acquisition (Browserless in production).
// QuotaGate: process-wide daily counter.
// PacingGate: minimum interval between acquisitions across requests.
//
// Mocks live in `testing.rs`, so resolver tests need no network and no sleeps.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use profilefinder_common::AcquisitionError;
use serde::Serialize;

use crate::fingerprint::Fingerprint;

// ---------------------------------------------------------------------------
// PageSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch rendered HTML for a search URL.
    async fn fetch(
        &self,
        url: &str,
        fingerprint: &Fingerprint,
        navigation_timeout: Duration,
    ) -> Result<String, AcquisitionError>;

    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// QuotaGate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub count: u32,
    pub max: u32,
    pub date: NaiveDate,
}

pub trait QuotaGate: Send + Sync {
    /// Reserve one unit of today's quota. `false` when exhausted.
    fn check_and_reserve(&self) -> bool;

    /// Note a completed resolution for the daily log line.
    fn record(&self, query: &str, found: bool);

    fn usage(&self) -> QuotaUsage;
}

// ---------------------------------------------------------------------------
// PacingGate
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PacingGate: Send + Sync {
    /// Wait until this caller may start an acquisition.
    async fn wait_turn(&self);
}
