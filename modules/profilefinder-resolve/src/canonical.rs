use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::platform::{is_platform_host, profile_url, CANONICAL_HOST};

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

/// Normalize a profile URL or bare identifier to
/// `https://www.linkedin.com/in/<id>/`. Idempotent.
///
/// Any `linkedin.com` host (country, mobile or mistyped subdomains, any
/// case) is replaced by the canonical one.
pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);

    let with_scheme = if SCHEME_RE.is_match(without_query) {
        without_query.to_string()
    } else if without_query.to_ascii_lowercase().contains("linkedin.com") {
        format!("https://{without_query}")
    } else {
        profile_url(without_query.trim_matches('/'))
    };

    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some_and(is_platform_host) => {
            format!("https://{CANONICAL_HOST}{}/", url.path().trim_end_matches('/'))
        }
        _ => format!("{}/", with_scheme.trim_end_matches('/')),
    }
}
