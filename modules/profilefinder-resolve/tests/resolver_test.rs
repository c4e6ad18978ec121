//! Orchestrator scenarios over mocked page sources: fallback chain,
//! challenge handling, timeouts, quota and identity enhancement.

use std::sync::Arc;
use std::time::Duration;

use profilefinder_common::{Provenance, Reason, ResolveError};
use profilefinder_resolve::provider::default_chain;
use profilefinder_resolve::testing::{mock_resolver, FakeQuota, MockPageSource, MockResponse};
use profilefinder_resolve::{Identity, QueryVariant, ResolverOptions, SearchProvider, StepOutcome};

const BING_RESULTS: &str = include_str!("fixtures/bing_results.html");
const CHALLENGE: &str = include_str!("fixtures/challenge.html");
const GOOGLE_RESULTS: &str = include_str!("fixtures/google_results.html");

const STEVENS_ONLY: &str = r#"<html><body><ol id="b_results">
  <li class="b_algo">
    <h2><a href="https://www.linkedin.com/in/sam-stevens-44112233">Sam Stevens - Designer | LinkedIn</a></h2>
    <cite>https://www.linkedin.com › in › sam-stevens-44112233</cite>
  </li>
</ol></body></html>"#;

fn sam() -> Identity {
    Identity::new("Sam Schalkwijk").unwrap().with_employer(Some("Acme"))
}

fn options() -> ResolverOptions {
    ResolverOptions {
        navigation_timeout: Duration::from_secs(15),
        chain: default_chain(None),
    }
}

#[tokio::test]
async fn first_step_hit_returns_canonical_winner() {
    let source = Arc::new(MockPageSource::new().on_query_html("Sam Schalkwijk Acme LinkedIn", BING_RESULTS));
    let quota = Arc::new(FakeQuota::new(500));
    let resolver = mock_resolver(source.clone(), quota.clone(), options());

    let result = resolver.resolve(sam()).await.unwrap();

    assert!(result.is_found());
    assert_eq!(
        result.canonical_url.as_deref(),
        Some("https://www.linkedin.com/in/sam-schalkwijk-22687b99/")
    );
    assert_eq!(result.reason, Some(Reason::ExactSurname));
    assert_eq!(result.match_score, Some(100));
    assert_eq!(result.winner.unwrap().provenance, Provenance::RedirectDecoded);
    assert_eq!(source.call_count(), 1);
    assert_eq!(result.attempts.len(), 1);
    assert!(matches!(
        result.attempts[0].outcome,
        StepOutcome::Found { candidate_count: 2, match_score: 100, .. }
    ));
    assert_eq!(quota.records(), vec![("Sam Schalkwijk".to_string(), true)]);
}

#[tokio::test]
async fn falls_back_to_query_without_employer() {
    let source = Arc::new(
        MockPageSource::new()
            .on_query_html("Sam Schalkwijk Acme LinkedIn", STEVENS_ONLY)
            .on_query_html("Sam Schalkwijk LinkedIn", BING_RESULTS),
    );
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let result = resolver.resolve(sam()).await.unwrap();

    assert!(result.is_found());
    assert_eq!(
        source.calls(),
        vec!["Sam Schalkwijk Acme LinkedIn", "Sam Schalkwijk LinkedIn"]
    );
    assert_eq!(
        result.attempts[0].outcome,
        StepOutcome::NoVerifiedCandidate { candidate_count: 1 }
    );
    assert_eq!(result.attempts[1].variant, QueryVariant::WithoutEmployer);
}

#[tokio::test]
async fn challenge_error_is_fatal_and_stops_the_chain() {
    let source = Arc::new(MockPageSource::new().otherwise(MockResponse::Challenge));
    let quota = Arc::new(FakeQuota::new(500));
    let resolver = mock_resolver(source.clone(), quota.clone(), options());

    let err = resolver.resolve(sam()).await.unwrap_err();

    assert!(matches!(err, ResolveError::BlockedByChallenge(ref p) if p == "bing"));
    assert_eq!(source.call_count(), 1);
    assert_eq!(quota.records(), vec![("Sam Schalkwijk".to_string(), false)]);
}

#[tokio::test]
async fn challenge_page_is_never_mined_for_candidates() {
    // The interstitial links a matching profile; it must not be returned.
    let source = Arc::new(MockPageSource::new().otherwise(MockResponse::Html(CHALLENGE.to_string())));
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let err = resolver.resolve(sam()).await.unwrap_err();

    assert!(matches!(err, ResolveError::BlockedByChallenge(_)));
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn timeout_advances_the_chain() {
    let source = Arc::new(
        MockPageSource::new()
            .on_query("Sam Schalkwijk Acme LinkedIn", MockResponse::Timeout)
            .on_query_html("Sam Schalkwijk LinkedIn", BING_RESULTS),
    );
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let result = resolver.resolve(sam()).await.unwrap();

    assert!(result.is_found());
    assert_eq!(result.attempts[0].outcome, StepOutcome::Timeout);
}

#[tokio::test(start_paused = true)]
async fn hung_acquisition_is_bounded() {
    let source = Arc::new(
        MockPageSource::new()
            .on_query("Sam Schalkwijk Acme LinkedIn", MockResponse::Hang)
            .on_query_html("Sam Schalkwijk LinkedIn", BING_RESULTS),
    );
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let result = resolver.resolve(sam()).await.unwrap();

    assert!(result.is_found());
    assert_eq!(result.attempts[0].outcome, StepOutcome::Timeout);
}

#[tokio::test]
async fn quota_is_checked_before_any_acquisition() {
    let source = Arc::new(MockPageSource::new().otherwise(MockResponse::Html(BING_RESULTS.to_string())));
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::with_count(500, 500)), options());

    let err = resolver.resolve(sam()).await.unwrap_err();

    assert!(matches!(err, ResolveError::QuotaExceeded { count: 500, max: 500 }));
    assert_eq!(err.to_string(), "Daily limit reached (500/500)");
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn miss_is_not_an_error() {
    let source = Arc::new(MockPageSource::new().otherwise(MockResponse::Html(STEVENS_ONLY.to_string())));
    let quota = Arc::new(FakeQuota::new(500));
    let resolver = mock_resolver(source.clone(), quota.clone(), options());

    let result = resolver.resolve(sam()).await.unwrap();

    assert!(!result.is_found());
    assert_eq!(result.canonical_url, None);
    assert_eq!(result.attempts.len(), 2);
    assert_eq!(quota.records(), vec![("Sam Schalkwijk".to_string(), false)]);
}

#[tokio::test]
async fn every_step_failing_is_an_acquisition_error() {
    let source = Arc::new(MockPageSource::new().otherwise(MockResponse::Failure("connection refused".into())));
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let err = resolver.resolve(sam()).await.unwrap_err();

    assert!(matches!(err, ResolveError::AcquisitionFailed(ref m) if m == "connection refused"));
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn repeated_query_is_skipped() {
    // Without an employer both primary variants produce the same query text.
    let source = Arc::new(MockPageSource::new());
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options());

    let result = resolver
        .resolve(Identity::new("Sam Schalkwijk").unwrap())
        .await
        .unwrap();

    assert_eq!(source.call_count(), 1);
    assert_eq!(result.attempts[0].outcome, StepOutcome::NoCandidates);
    assert_eq!(result.attempts[1].outcome, StepOutcome::SkippedDuplicate);
}

#[tokio::test]
async fn bare_name_is_enhanced_and_fallback_provider_used() {
    let source = Arc::new(MockPageSource::new().on_provider_query(
        SearchProvider::Google,
        "Cees van de Haar WUR LinkedIn",
        MockResponse::Html(GOOGLE_RESULTS.to_string()),
    ));
    let options = ResolverOptions {
        chain: default_chain(Some(SearchProvider::Google)),
        ..options()
    };
    let resolver = mock_resolver(source.clone(), Arc::new(FakeQuota::new(500)), options);

    let identity = Identity::new("Cees")
        .unwrap()
        .with_employer(Some("WUR"))
        .with_email(Some("cees.vandehaar@example.nl"));
    let result = resolver.resolve(identity).await.unwrap();

    assert_eq!(result.query_name, "Cees van de Haar");
    assert_eq!(
        source.calls(),
        vec![
            "Cees van de Haar WUR LinkedIn",
            "Cees van de Haar LinkedIn",
            "Cees van de Haar WUR LinkedIn",
        ]
    );
    assert_eq!(result.attempts[2].provider, SearchProvider::Google);
    assert_eq!(
        result.canonical_url.as_deref(),
        Some("https://www.linkedin.com/in/cees-van-de-haar-0b1c2d3e/")
    );
    assert_eq!(result.match_score, Some(100));
}

#[tokio::test]
async fn attempts_serialize_with_outcome_tag() {
    let source = Arc::new(MockPageSource::new().on_query("Sam Schalkwijk Acme LinkedIn", MockResponse::Timeout));
    let resolver = mock_resolver(source, Arc::new(FakeQuota::new(500)), options());

    let result = resolver.resolve(sam()).await.unwrap();
    let json = serde_json::to_value(&result.attempts).unwrap();

    assert_eq!(json[0]["provider"], "bing");
    assert_eq!(json[0]["variant"], "with_employer");
    assert_eq!(json[0]["outcome"], "timeout");
    assert_eq!(json[1]["outcome"], "no_candidates");
}
