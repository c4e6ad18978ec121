// Randomized browser fingerprint and pacing jitter, from one injectable RNG.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

const VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (1440, 900), (1536, 864)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Seeded RNG shared by every acquisition. Never consulted by extraction,
/// verification or ranking.
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let user_agent = USER_AGENTS.choose(&mut *rng).copied().unwrap_or(USER_AGENTS[0]);
        let (width, height) = VIEWPORTS.choose(&mut *rng).copied().unwrap_or(VIEWPORTS[0]);
        Fingerprint {
            user_agent: user_agent.to_string(),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Uniform delay in `[0, max]`.
    pub fn jitter(&self, max: Duration) -> Duration {
        let max_ms = max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Duration::from_millis(rng.random_range(0..=max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let a = RandomSource::seeded(7);
        let b = RandomSource::seeded(7);
        for _ in 0..5 {
            assert_eq!(a.fingerprint(), b.fingerprint());
            assert_eq!(a.jitter(Duration::from_secs(1)), b.jitter(Duration::from_secs(1)));
        }
    }

    #[test]
    fn fingerprint_comes_from_known_pools() {
        let source = RandomSource::seeded(42);
        for _ in 0..20 {
            let fp = source.fingerprint();
            assert!(USER_AGENTS.contains(&fp.user_agent.as_str()));
            assert!(VIEWPORTS.contains(&(fp.viewport_width, fp.viewport_height)));
        }
    }

    #[test]
    fn jitter_is_bounded() {
        let source = RandomSource::seeded(1);
        assert_eq!(source.jitter(Duration::ZERO), Duration::ZERO);
        for _ in 0..50 {
            assert!(source.jitter(Duration::from_millis(250)) <= Duration::from_millis(250));
        }
    }
}
