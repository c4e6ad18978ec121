use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use profilefinder_common::ResolveError;
use profilefinder_resolve::identity::clean_input;
use profilefinder_resolve::{AttemptRecord, Identity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::AppState;

pub const MISS_ERROR: &str = "No verified LinkedIn profile found";
pub const MISS_REASON: &str = "Could not find or verify a matching LinkedIn profile";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    #[serde(default)]
    search_query: Option<String>,
    #[serde(default)]
    company: Option<String>,
    /// Echoed back untouched; callers send strings or numbers.
    #[serde(default)]
    contact_id: Option<Value>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    success: bool,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attempts: Vec<AttemptRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scraped_at: Option<DateTime<Utc>>,
}

impl ScrapeResponse {
    fn failure(name: String, contact_id: Option<Value>, error: String, reason: Option<&str>) -> Self {
        Self {
            success: false,
            name,
            profile_url: None,
            contact_id,
            error: Some(error),
            reason: reason.map(String::from),
            attempts: Vec::new(),
            scraped_at: None,
        }
    }
}

fn status_for(err: &ResolveError) -> (StatusCode, &'static str) {
    match err {
        ResolveError::InvalidIdentity(_) => (StatusCode::BAD_REQUEST, "Search name is not usable"),
        ResolveError::QuotaExceeded { .. } => {
            (StatusCode::TOO_MANY_REQUESTS, "Daily search limit reached")
        }
        ResolveError::BlockedByChallenge(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Search provider served a challenge page",
        ),
        ResolveError::AcquisitionFailed(_) => {
            (StatusCode::BAD_GATEWAY, "Search provider could not be reached")
        }
    }
}

pub async fn scrape(State(state): State<Arc<AppState>>, Json(body): Json<ScrapeRequest>) -> Response {
    let name = clean_input(body.search_query.as_deref().unwrap_or_default());
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ScrapeResponse::failure(
                name,
                body.contact_id,
                "searchQuery is required".to_string(),
                None,
            )),
        )
            .into_response();
    }

    let identity = match Identity::new(&name) {
        Ok(identity) => identity
            .with_employer(body.company.as_deref())
            .with_email(body.email.as_deref()),
        Err(e) => {
            let (status, reason) = status_for(&e);
            return (
                status,
                Json(ScrapeResponse::failure(name, body.contact_id, e.to_string(), Some(reason))),
            )
                .into_response();
        }
    };

    info!(
        name = identity.display_name(),
        company = identity.employer().unwrap_or("N/A"),
        contact_id = ?body.contact_id,
        "New search request"
    );

    match state.resolver.resolve(identity).await {
        Ok(result) => {
            let found = result.is_found();
            if !found {
                warn!(name = result.query_name.as_str(), "No verified LinkedIn profile found");
            }
            Json(ScrapeResponse {
                success: found,
                name: result.query_name,
                profile_url: result.canonical_url,
                contact_id: body.contact_id,
                error: (!found).then(|| MISS_ERROR.to_string()),
                reason: (!found).then(|| MISS_REASON.to_string()),
                attempts: result.attempts,
                scraped_at: Some(Utc::now()),
            })
            .into_response()
        }
        Err(e) => {
            let (status, reason) = status_for(&e);
            warn!(name = name.as_str(), error = %e, status = status.as_u16(), "Search failed");
            (
                status,
                Json(ScrapeResponse::failure(name, body.contact_id, e.to_string(), Some(reason))),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    mode: String,
    daily_count: u32,
    max_daily: u32,
    date: NaiveDate,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let usage = state.quota.usage();
    Json(HealthResponse {
        status: "ok",
        mode: state.mode.clone(),
        daily_count: usage.count,
        max_daily: usage.max,
        date: usage.date,
    })
}

pub async fn test(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "LinkedIn profile finder is ready",
        "mode": state.mode,
    }))
}
