use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use browserless_client::BrowserlessClient;
use profilefinder_api::{router, AppState};
use profilefinder_common::Config;
use profilefinder_resolve::acquire::BrowserlessPageSource;
use profilefinder_resolve::fingerprint::RandomSource;
use profilefinder_resolve::pacing::MinIntervalPacer;
use profilefinder_resolve::provider::default_chain;
use profilefinder_resolve::quota::DailyQuota;
use profilefinder_resolve::{Resolver, ResolverOptions, SearchProvider};

/// Stdout plus an append-only file per calendar day under `log_dir`.
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("profile-finder.log")
        .build(&config.log_dir)
        .context("initializing daily log file")?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::from_default_env()
        .add_directive("profilefinder=info".parse()?)
        .add_directive("browserless_client=info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let _log_guard = init_tracing(&config)?;
    config.log_redacted();

    let fallback = match config.fallback_provider.as_deref() {
        Some(name) => Some(
            SearchProvider::parse(name)
                .with_context(|| format!("FALLBACK_PROVIDER {name:?} is not a known provider"))?,
        ),
        None => None,
    };

    let random = Arc::new(match config.rng_seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_os_rng(),
    });
    let client = BrowserlessClient::new(&config.browserless_url, config.browserless_token.as_deref())?;
    let quota = Arc::new(DailyQuota::new(config.max_daily));
    let pacer = Arc::new(MinIntervalPacer::new(
        config.min_request_interval,
        config.pacing_jitter,
        random.clone(),
    ));

    let resolver = Resolver::new(
        Arc::new(BrowserlessPageSource::new(client)),
        pacer,
        quota.clone(),
        random,
        ResolverOptions {
            navigation_timeout: config.navigation_timeout,
            chain: default_chain(fallback),
        },
    );

    let state = Arc::new(AppState::new(resolver, quota));
    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(
        mode = state.mode.as_str(),
        max_daily = config.max_daily,
        "Profile finder starting on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
