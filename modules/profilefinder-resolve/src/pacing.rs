use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::fingerprint::RandomSource;
use crate::traits::PacingGate;

/// Enforces a minimum interval (plus random jitter) between successive
/// acquisitions across all in-flight requests.
///
/// The lock is held while sleeping, so waiters are released one at a time.
pub struct MinIntervalPacer {
    min_interval: Duration,
    max_jitter: Duration,
    random: Arc<RandomSource>,
    last_start: Mutex<Option<Instant>>,
}

impl MinIntervalPacer {
    pub fn new(min_interval: Duration, max_jitter: Duration, random: Arc<RandomSource>) -> Self {
        Self {
            min_interval,
            max_jitter,
            random,
            last_start: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PacingGate for MinIntervalPacer {
    async fn wait_turn(&self) {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed + self.random.jitter(self.max_jitter);
                debug!(wait_ms = wait.as_millis() as u64, "Pacing before next acquisition");
                tokio::time::sleep(wait).await;
            }
        }
        *last_start = Some(Instant::now());
    }
}
