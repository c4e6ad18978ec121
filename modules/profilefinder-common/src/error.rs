use std::time::Duration;

use thiserror::Error;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failures surfaced by a page-content provider.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Navigation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Acquisition failed: {0}")]
    Failed(String),

    /// The provider served an anti-automation interstitial instead of results.
    #[error("Challenge page served for {0}")]
    Challenge(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0} served an anti-automation challenge page")]
    BlockedByChallenge(String),

    #[error("Daily limit reached ({count}/{max})")]
    QuotaExceeded { count: u32, max: u32 },

    #[error("Every provider step failed: {0}")]
    AcquisitionFailed(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_matches_log_format() {
        let err = ResolveError::QuotaExceeded { count: 500, max: 500 };
        assert_eq!(err.to_string(), "Daily limit reached (500/500)");
    }

    #[test]
    fn timeout_message_reports_millis() {
        let err = AcquisitionError::Timeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "Navigation timed out after 15000ms");
    }
}
