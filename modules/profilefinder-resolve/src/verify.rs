// Identity verification: does a candidate plausibly denote the queried person?
//
// The decision is an ordered list of rules; the first rule whose predicate
// holds decides the verdict. Rules that only apply to single-token or
// multi-token queries check that themselves, so the list order is the
// complete precedence.

use profilefinder_common::{ProfileCandidate, Reason, VerificationVerdict};
use tracing::debug;

use crate::identity::Identity;
use crate::normalize::{normalize, split_profile_id, tokenize, without_prefixes};
use crate::platform::find_profile;
use crate::rank::{candidate_token_string, match_score};
use crate::similarity::similarity;

const FUZZY_THRESHOLD: f64 = 0.8;
const DIFFERENT_SURNAME_THRESHOLD: f64 = 0.3;
const EMPLOYER_KEY_LEN: usize = 5;

/// What the rules look at for one candidate text.
struct Evidence<'a> {
    identity: &'a Identity,
    tokens: Vec<String>,
    /// Tokens joined by single spaces.
    text: String,
}

struct Rule {
    reason: Reason,
    holds: fn(&Evidence<'_>) -> bool,
}

const RULES: &[Rule] = &[
    Rule { reason: Reason::FirstNameMiss, holds: misses_first_name },
    Rule { reason: Reason::SingleNameExact, holds: single_name_exact },
    Rule { reason: Reason::SingleNameAmbiguous, holds: single_name_ambiguous },
    Rule { reason: Reason::SingleNameMismatch, holds: single_name_query },
    Rule { reason: Reason::ExactSurname, holds: exact_surname },
    Rule { reason: Reason::SurnameInitial, holds: surname_initial },
    Rule { reason: Reason::FuzzySurname, holds: fuzzy_surname },
    Rule { reason: Reason::DifferentSurname, holds: different_surname },
    Rule { reason: Reason::CoreSurname, holds: core_surname },
    Rule { reason: Reason::EmployerCorroboration, holds: employer_corroboration },
];

/// Token parts of a candidate text.
///
/// A profile URL inside the text wins; a single whitespace-free word is
/// treated as a bare profile id; anything else is free text.
pub fn candidate_tokens(candidate_text: &str) -> Vec<String> {
    let trimmed = candidate_text.trim();
    if let Some(profile) = find_profile(trimmed) {
        return split_profile_id(&profile.profile_id);
    }
    if !trimmed.contains(char::is_whitespace) {
        return split_profile_id(trimmed);
    }
    tokenize(&normalize(trimmed))
}

/// Run the rule cascade over one candidate text (URL, profile id or caption).
pub fn verify_text(identity: &Identity, candidate_text: &str) -> Reason {
    let tokens = candidate_tokens(candidate_text);
    let evidence = Evidence {
        identity,
        text: tokens.join(" "),
        tokens,
    };

    RULES
        .iter()
        .find(|rule| (rule.holds)(&evidence))
        .map(|rule| rule.reason)
        .unwrap_or(Reason::InsufficientMatch)
}

/// Verify a candidate by its profile id, falling back to its display text.
pub fn verify(identity: &Identity, candidate: ProfileCandidate) -> VerificationVerdict {
    let mut reason = verify_text(identity, &candidate.profile_id);
    if !reason.is_accepted() && !candidate.display_text.trim().is_empty() {
        let by_text = verify_text(identity, &candidate.display_text);
        if by_text.is_accepted() {
            reason = by_text;
        }
    }

    if reason.is_accepted() {
        let score = match_score(identity, &candidate_token_string(&candidate));
        debug!(
            profile_id = candidate.profile_id.as_str(),
            reason = reason.as_str(),
            score,
            "Candidate accepted"
        );
        VerificationVerdict::accept(candidate, reason, score)
    } else {
        debug!(
            profile_id = candidate.profile_id.as_str(),
            reason = reason.as_str(),
            "Candidate rejected"
        );
        VerificationVerdict::reject(candidate, reason)
    }
}

// --- Rules ---

fn misses_first_name(e: &Evidence<'_>) -> bool {
    let first = e.identity.first_name();
    !e.tokens.iter().any(|part| {
        part == first || (first.len() > 2 && part.starts_with(&first[..3]))
    })
}

fn single_name_exact(e: &Evidence<'_>) -> bool {
    !e.identity.has_surname() && e.tokens.len() == 1 && e.tokens[0] == e.identity.first_name()
}

fn single_name_ambiguous(e: &Evidence<'_>) -> bool {
    !e.identity.has_surname() && e.tokens.len() > 1
}

fn single_name_query(e: &Evidence<'_>) -> bool {
    !e.identity.has_surname()
}

fn exact_surname(e: &Evidence<'_>) -> bool {
    let last = e.identity.last_name();
    e.tokens.iter().any(|part| part == last)
}

fn surname_initial(e: &Evidence<'_>) -> bool {
    let Some(initial) = e.identity.last_name().chars().next() else {
        return false;
    };
    e.tokens
        .iter()
        .any(|part| part.chars().count() == 1 && part.starts_with(initial))
}

fn fuzzy_surname(e: &Evidence<'_>) -> bool {
    let last = e.identity.last_name();
    e.tokens
        .iter()
        .any(|part| similarity(part, last) > FUZZY_THRESHOLD)
}

fn different_surname(e: &Evidence<'_>) -> bool {
    let Some(candidate_last) = e.tokens.last() else {
        return false;
    };
    candidate_last.chars().count() > 2
        && similarity(candidate_last, e.identity.last_name()) < DIFFERENT_SURNAME_THRESHOLD
        && !surname_initial(e)
}

fn core_surname(e: &Evidence<'_>) -> bool {
    let query_tokens = tokenize(&e.identity.tokens().join(" "));
    let query_core = without_prefixes(&query_tokens);
    if query_core.len() < 2 {
        return false;
    }
    let core_last = query_core[query_core.len() - 1];

    without_prefixes(&e.tokens)
        .into_iter()
        .any(|part| part == core_last || similarity(part, core_last) > FUZZY_THRESHOLD)
}

fn employer_corroboration(e: &Evidence<'_>) -> bool {
    let Some(employer) = e.identity.employer() else {
        return false;
    };
    let key: String = normalize(employer).chars().take(EMPLOYER_KEY_LEN).collect();
    let key = key.trim_end();
    !key.is_empty() && e.text.contains(key)
}
