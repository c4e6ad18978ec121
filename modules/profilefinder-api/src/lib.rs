use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use profilefinder_resolve::{QuotaGate, Resolver};

pub mod routes;

pub struct AppState {
    pub resolver: Resolver,
    pub quota: Arc<dyn QuotaGate>,
    /// Provider chain summary reported by the status endpoints.
    pub mode: String,
}

impl AppState {
    pub fn new(resolver: Resolver, quota: Arc<dyn QuotaGate>) -> Self {
        let mut providers: Vec<&str> = Vec::new();
        for step in &resolver.options().chain {
            if !providers.contains(&step.provider.name()) {
                providers.push(step.provider.name());
            }
        }
        Self {
            mode: format!("{}-search", providers.join("+")),
            resolver,
            quota,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape", post(routes::scrape))
        .route("/health", get(routes::health))
        .route("/test", get(routes::test))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // method + path only; request bodies carry personal data
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
