// Test doubles for the resolver's collaborators.
//
// MockPageSource: canned HTML (or failures) per search query, records calls.
// FakeQuota: in-memory counter with a fixed date.
// NoopPacer: counts turns, never sleeps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use profilefinder_common::AcquisitionError;

use crate::fingerprint::{Fingerprint, RandomSource};
use crate::provider::SearchProvider;
use crate::resolver::{Resolver, ResolverOptions};
use crate::traits::{PacingGate, PageSource, QuotaGate, QuotaUsage};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Html(String),
    Timeout,
    Failure(String),
    Challenge,
    /// Never completes; exercises the resolver's own timeout.
    Hang,
}

/// Responds per search query (the `q` parameter of the fetched URL),
/// optionally scoped to one provider's host.
pub struct MockPageSource {
    responses: HashMap<(Option<String>, String), MockResponse>,
    fallback: MockResponse,
    calls: Mutex<Vec<String>>,
}

impl Default for MockPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPageSource {
    /// Every unknown query gets an empty results page.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fallback: MockResponse::Html("<html><body><ol id=\"b_results\"></ol></body></html>".into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_query(mut self, query: &str, response: MockResponse) -> Self {
        self.responses.insert((None, query.to_string()), response);
        self
    }

    pub fn on_provider_query(
        mut self,
        provider: SearchProvider,
        query: &str,
        response: MockResponse,
    ) -> Self {
        self.responses
            .insert((Some(provider.host().to_string()), query.to_string()), response);
        self
    }

    pub fn on_query_html(self, query: &str, html: &str) -> Self {
        self.on_query(query, MockResponse::Html(html.to_string()))
    }

    pub fn otherwise(mut self, response: MockResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Queries fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Host and `q` parameter of a search URL.
fn host_and_query(url: &str) -> (Option<String>, String) {
    match url::Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().map(String::from),
            parsed
                .query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default(),
        ),
        Err(_) => (None, url.to_string()),
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch(
        &self,
        url: &str,
        _fingerprint: &Fingerprint,
        navigation_timeout: Duration,
    ) -> Result<String, AcquisitionError> {
        let (host, query) = host_and_query(url);
        self.calls.lock().unwrap().push(query.clone());

        let response = self
            .responses
            .get(&(host, query.clone()))
            .or_else(|| self.responses.get(&(None, query)))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        match response {
            MockResponse::Html(html) => Ok(html),
            MockResponse::Timeout => Err(AcquisitionError::Timeout(navigation_timeout)),
            MockResponse::Failure(message) => Err(AcquisitionError::Failed(message)),
            MockResponse::Challenge => Err(AcquisitionError::Challenge(url.to_string())),
            MockResponse::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Quota with a fixed date and inspectable records.
pub struct FakeQuota {
    max: u32,
    count: Mutex<u32>,
    records: Mutex<Vec<(String, bool)>>,
}

impl FakeQuota {
    pub fn new(max: u32) -> Self {
        Self::with_count(0, max)
    }

    pub fn with_count(count: u32, max: u32) -> Self {
        Self {
            max,
            count: Mutex::new(count),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<(String, bool)> {
        self.records.lock().unwrap().clone()
    }
}

impl QuotaGate for FakeQuota {
    fn check_and_reserve(&self) -> bool {
        let mut count = self.count.lock().unwrap();
        if *count >= self.max {
            return false;
        }
        *count += 1;
        true
    }

    fn record(&self, query: &str, found: bool) {
        self.records.lock().unwrap().push((query.to_string(), found));
    }

    fn usage(&self) -> QuotaUsage {
        QuotaUsage {
            count: *self.count.lock().unwrap(),
            max: self.max,
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }
}

#[derive(Default)]
pub struct NoopPacer {
    turns: AtomicUsize,
}

impl NoopPacer {
    pub fn turns(&self) -> usize {
        self.turns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PacingGate for NoopPacer {
    async fn wait_turn(&self) {
        self.turns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolver over mocks with a fixed seed.
pub fn mock_resolver(
    source: Arc<MockPageSource>,
    quota: Arc<FakeQuota>,
    options: ResolverOptions,
) -> Resolver {
    Resolver::new(
        source,
        Arc::new(NoopPacer::default()),
        quota,
        Arc::new(RandomSource::seeded(0)),
        options,
    )
}
