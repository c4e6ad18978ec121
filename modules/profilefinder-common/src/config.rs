use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Browserless
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Pacing and quota
    pub max_daily: u32,
    pub min_request_interval: Duration,
    pub pacing_jitter: Duration,
    pub navigation_timeout: Duration,

    // Resolution
    pub fallback_provider: Option<String>,
    pub rng_seed: Option<u64>,

    // Logging
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            browserless_url: env::var("BROWSERLESS_URL")
                .context("BROWSERLESS_URL environment variable is required")?,
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|t| !t.is_empty()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parsed_env("API_PORT", 3000)?,
            max_daily: parsed_env("MAX_DAILY", 500)?,
            min_request_interval: Duration::from_millis(parsed_env(
                "MIN_REQUEST_INTERVAL_MS",
                3000,
            )?),
            pacing_jitter: Duration::from_millis(parsed_env("PACING_JITTER_MS", 1000)?),
            navigation_timeout: Duration::from_millis(parsed_env("NAVIGATION_TIMEOUT_MS", 15000)?),
            fallback_provider: env::var("FALLBACK_PROVIDER")
                .ok()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty()),
            rng_seed: match env::var("RNG_SEED") {
                Ok(raw) => Some(raw.parse().context("RNG_SEED must be an unsigned integer")?),
                Err(_) => None,
            },
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
        };

        Ok(config)
    }

    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  BROWSERLESS_URL: {}", self.browserless_url);
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
        tracing::info!("  MAX_DAILY: {}", self.max_daily);
        tracing::info!(
            "  MIN_REQUEST_INTERVAL_MS: {}",
            self.min_request_interval.as_millis()
        );
        tracing::info!("  NAVIGATION_TIMEOUT_MS: {}", self.navigation_timeout.as_millis());
        tracing::info!(
            "  FALLBACK_PROVIDER: {}",
            self.fallback_provider.as_deref().unwrap_or("<not set>")
        );
    }
}

/// First five characters of a secret plus its length.
fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => {
            let head: String = v.chars().take(5).collect();
            format!("{head}...({} chars)", v.chars().count())
        }
        _ => "<not set>".to_string(),
    }
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_counts_characters_not_bytes() {
        let token = Some("ééééééé-secret".to_string());
        assert_eq!(preview_opt(&token), "ééééé...(14 chars)");
        assert_eq!(preview_opt(&None), "<not set>");
    }

    #[test]
    fn parsed_env_falls_back_to_default() {
        let value: u32 = parsed_env("PROFILEFINDER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }
}
