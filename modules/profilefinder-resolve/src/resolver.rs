// Resolution orchestrator: walks the fallback chain until a step produces a
// verified winner, a challenge page aborts the request, or the chain runs out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use profilefinder_common::{
    AcquisitionError, ProfileCandidate, Provenance, Reason, ResolveError, Result,
    VerificationVerdict,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::canonical::canonicalize;
use crate::enhance::enhance_identity;
use crate::extract::Extractor;
use crate::fingerprint::RandomSource;
use crate::identity::Identity;
use crate::page::PageContent;
use crate::provider::{build_query, default_chain, QueryVariant, ResolutionStep, SearchProvider};
use crate::rank::rank;
use crate::traits::{PacingGate, PageSource, QuotaGate};
use crate::verify::verify;

/// Grace on top of the navigation timeout before an acquisition is abandoned.
const ACQUISITION_SLACK: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub navigation_timeout: Duration,
    pub chain: Vec<ResolutionStep>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(15),
            chain: default_chain(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Found {
        candidate_count: usize,
        provenance: Provenance,
        profile_id: String,
        match_score: u32,
    },
    NoCandidates,
    NoVerifiedCandidate {
        candidate_count: usize,
    },
    Timeout,
    Failed {
        message: String,
    },
    SkippedDuplicate,
}

impl StepOutcome {
    fn is_acquisition_failure(&self) -> bool {
        matches!(self, StepOutcome::Timeout | StepOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub provider: SearchProvider,
    pub variant: QueryVariant,
    pub query: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    /// Display name actually searched for, after enhancement.
    pub query_name: String,
    pub winner: Option<ProfileCandidate>,
    /// Present exactly when `winner` is.
    pub canonical_url: Option<String>,
    pub match_score: Option<u32>,
    pub reason: Option<Reason>,
    pub attempts: Vec<AttemptRecord>,
}

impl ResolutionResult {
    pub fn is_found(&self) -> bool {
        self.winner.is_some()
    }
}

enum StepResult {
    Hit {
        verdict: VerificationVerdict,
        candidate_count: usize,
    },
    Miss(StepOutcome),
}

pub struct Resolver {
    source: Arc<dyn PageSource>,
    pacer: Arc<dyn PacingGate>,
    quota: Arc<dyn QuotaGate>,
    random: Arc<RandomSource>,
    extractor: Extractor,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn PageSource>,
        pacer: Arc<dyn PacingGate>,
        quota: Arc<dyn QuotaGate>,
        random: Arc<RandomSource>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            source,
            pacer,
            quota,
            random,
            extractor: Extractor::default(),
            options,
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub async fn resolve(&self, identity: Identity) -> Result<ResolutionResult> {
        let identity = enhance_identity(identity);

        if !self.quota.check_and_reserve() {
            let usage = self.quota.usage();
            warn!(count = usage.count, max = usage.max, "Daily limit reached");
            return Err(ResolveError::QuotaExceeded {
                count: usage.count,
                max: usage.max,
            });
        }

        info!(
            name = identity.display_name(),
            employer = identity.employer().unwrap_or(""),
            source = self.source.name(),
            "Resolving profile"
        );

        let mut attempts = Vec::with_capacity(self.options.chain.len());
        let mut searched: HashSet<(SearchProvider, String)> = HashSet::new();

        for step in &self.options.chain {
            let query = build_query(&identity, step.variant);
            if !searched.insert((step.provider, query.clone())) {
                info!(provider = %step.provider, variant = %step.variant, "Skipping repeated query");
                attempts.push(AttemptRecord {
                    provider: step.provider,
                    variant: step.variant,
                    query,
                    outcome: StepOutcome::SkippedDuplicate,
                });
                continue;
            }

            let result = match self.run_step(&identity, step, &query).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(provider = %step.provider, error = %e, "Aborting resolution");
                    self.quota.record(identity.display_name(), false);
                    return Err(e);
                }
            };

            match result {
                StepResult::Hit {
                    verdict,
                    candidate_count,
                } => {
                    let score = verdict.match_score.unwrap_or_default();
                    let canonical_url = canonicalize(&verdict.candidate.raw_url);
                    info!(
                        provider = %step.provider,
                        variant = %step.variant,
                        url = canonical_url.as_str(),
                        reason = verdict.reason.as_str(),
                        score,
                        "Verified profile found"
                    );
                    attempts.push(AttemptRecord {
                        provider: step.provider,
                        variant: step.variant,
                        query,
                        outcome: StepOutcome::Found {
                            candidate_count,
                            provenance: verdict.candidate.provenance,
                            profile_id: verdict.candidate.profile_id.clone(),
                            match_score: score,
                        },
                    });
                    self.quota.record(identity.display_name(), true);
                    return Ok(ResolutionResult {
                        query_name: identity.display_name().to_string(),
                        canonical_url: Some(canonical_url),
                        match_score: verdict.match_score,
                        reason: Some(verdict.reason),
                        winner: Some(verdict.candidate),
                        attempts,
                    });
                }
                StepResult::Miss(outcome) => {
                    info!(
                        provider = %step.provider,
                        variant = %step.variant,
                        outcome = ?outcome,
                        "No winner for step"
                    );
                    attempts.push(AttemptRecord {
                        provider: step.provider,
                        variant: step.variant,
                        query,
                        outcome,
                    });
                }
            }
        }

        self.quota.record(identity.display_name(), false);
        self.exhausted(identity, attempts)
    }

    /// Exhaustion is an error only when no step ever got a page to look at.
    fn exhausted(
        &self,
        identity: Identity,
        attempts: Vec<AttemptRecord>,
    ) -> Result<ResolutionResult> {
        let mut searched = attempts
            .iter()
            .filter(|a| a.outcome != StepOutcome::SkippedDuplicate)
            .peekable();
        let any_searched = searched.peek().is_some();
        if any_searched && searched.all(|a| a.outcome.is_acquisition_failure()) {
            let last = attempts
                .iter()
                .rev()
                .find_map(|a| match &a.outcome {
                    StepOutcome::Failed { message } => Some(message.clone()),
                    StepOutcome::Timeout => Some(format!("{} timed out", a.provider)),
                    _ => None,
                })
                .unwrap_or_default();
            warn!(name = identity.display_name(), last_error = last.as_str(), "Every step failed");
            return Err(ResolveError::AcquisitionFailed(last));
        }

        info!(name = identity.display_name(), "No verified profile found");
        Ok(ResolutionResult {
            query_name: identity.display_name().to_string(),
            winner: None,
            canonical_url: None,
            match_score: None,
            reason: None,
            attempts,
        })
    }

    async fn run_step(
        &self,
        identity: &Identity,
        step: &ResolutionStep,
        query: &str,
    ) -> Result<StepResult> {
        let url = step.provider.search_url(query);
        let fingerprint = self.random.fingerprint();
        let navigation_timeout = self.options.navigation_timeout;

        self.pacer.wait_turn().await;
        info!(provider = %step.provider, variant = %step.variant, query, "Searching");

        let fetched = tokio::time::timeout(
            navigation_timeout + ACQUISITION_SLACK,
            self.source.fetch(&url, &fingerprint, navigation_timeout),
        )
        .await;

        let html = match fetched {
            Ok(Ok(html)) => html,
            Ok(Err(AcquisitionError::Challenge(_))) => {
                return Err(ResolveError::BlockedByChallenge(step.provider.to_string()));
            }
            Ok(Err(AcquisitionError::Timeout(_))) | Err(_) => {
                warn!(provider = %step.provider, timeout_ms = navigation_timeout.as_millis() as u64, "Acquisition timed out");
                return Ok(StepResult::Miss(StepOutcome::Timeout));
            }
            Ok(Err(AcquisitionError::Failed(message))) => {
                warn!(provider = %step.provider, error = message.as_str(), "Acquisition failed");
                return Ok(StepResult::Miss(StepOutcome::Failed { message }));
            }
        };

        let page = PageContent::parse(&html, &url, &step.provider.layout());
        if page.is_challenge() {
            return Err(ResolveError::BlockedByChallenge(step.provider.to_string()));
        }

        let candidates = self.extractor.extract(&page, step.provider);
        let candidate_count = candidates.len();
        if candidates.is_empty() {
            return Ok(StepResult::Miss(StepOutcome::NoCandidates));
        }

        let verdicts: Vec<VerificationVerdict> = candidates
            .into_iter()
            .map(|candidate| verify(identity, candidate))
            .collect();

        Ok(match rank(&verdicts) {
            Some(winner) => StepResult::Hit {
                verdict: winner.clone(),
                candidate_count,
            },
            None => StepResult::Miss(StepOutcome::NoVerifiedCandidate { candidate_count }),
        })
    }
}
