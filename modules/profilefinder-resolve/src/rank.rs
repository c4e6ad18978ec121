use profilefinder_common::{ProfileCandidate, VerificationVerdict};

use crate::identity::Identity;
use crate::normalize::split_profile_id;

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_ALL_TOKENS: u32 = 80;
pub const SCORE_FIRST_AND_INITIAL: u32 = 60;
pub const SCORE_BASELINE: u32 = 40;

/// The candidate's profile-id tokens joined with `-`.
pub fn candidate_token_string(candidate: &ProfileCandidate) -> String {
    split_profile_id(&candidate.profile_id).join("-")
}

/// How well a candidate token string fits the query name.
pub fn match_score(identity: &Identity, candidate_tokens: &str) -> u32 {
    let query = identity.tokens();

    if query.join("-") == candidate_tokens {
        return SCORE_EXACT;
    }
    if query.iter().all(|token| candidate_tokens.contains(token.as_str())) {
        return SCORE_ALL_TOKENS;
    }
    if let [first, .., last] = query {
        let initial_present = last
            .chars()
            .next()
            .is_some_and(|initial| candidate_tokens.contains(initial));
        if candidate_tokens.contains(first.as_str()) && initial_present {
            return SCORE_FIRST_AND_INITIAL;
        }
    }
    SCORE_BASELINE
}

/// Pick the accepted verdict with the highest score. Ties keep the first seen.
pub fn rank(verdicts: &[VerificationVerdict]) -> Option<&VerificationVerdict> {
    let mut best: Option<&VerificationVerdict> = None;
    for verdict in verdicts.iter().filter(|v| v.accepted) {
        let score = verdict.match_score.unwrap_or(SCORE_BASELINE);
        match best {
            Some(current) if current.match_score.unwrap_or(SCORE_BASELINE) >= score => {}
            _ => best = Some(verdict),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use profilefinder_common::{Provenance, Reason};

    fn verdict(profile_id: &str, score: Option<u32>) -> VerificationVerdict {
        let candidate = ProfileCandidate {
            raw_url: format!("https://www.linkedin.com/in/{profile_id}"),
            profile_id: profile_id.to_string(),
            display_text: String::new(),
            provenance: Provenance::DirectLink,
        };
        match score {
            Some(score) => VerificationVerdict::accept(candidate, Reason::ExactSurname, score),
            None => VerificationVerdict::reject(candidate, Reason::DifferentSurname),
        }
    }

    #[test]
    fn exact_token_string_scores_100() {
        let identity = Identity::new("Sam Schalkwijk").unwrap();
        assert_eq!(match_score(&identity, "sam-schalkwijk"), SCORE_EXACT);
    }

    #[test]
    fn all_tokens_present_scores_80() {
        let identity = Identity::new("Sam Schalkwijk").unwrap();
        assert_eq!(match_score(&identity, "sam-schalkwijk-mba"), SCORE_ALL_TOKENS);
    }

    #[test]
    fn first_and_initial_scores_60() {
        let identity = Identity::new("Sam Schalkwijk").unwrap();
        assert_eq!(match_score(&identity, "sam-s"), SCORE_FIRST_AND_INITIAL);
    }

    #[test]
    fn otherwise_baseline() {
        let identity = Identity::new("Samuel Schalkwijk").unwrap();
        assert_eq!(match_score(&identity, "sam-bakker"), SCORE_BASELINE);
    }

    #[test]
    fn highest_score_wins() {
        let verdicts = vec![verdict("sam-schalkwijk-mba", Some(80)), verdict("sam-schalkwijk", Some(100))];
        assert_eq!(rank(&verdicts).unwrap().candidate.profile_id, "sam-schalkwijk");
    }

    #[test]
    fn ties_keep_first_seen() {
        let verdicts = vec![verdict("first", Some(80)), verdict("second", Some(80))];
        for _ in 0..5 {
            assert_eq!(rank(&verdicts).unwrap().candidate.profile_id, "first");
        }
    }

    #[test]
    fn rejected_verdicts_never_win() {
        let verdicts = vec![verdict("rejected", None), verdict("accepted", Some(40))];
        assert_eq!(rank(&verdicts).unwrap().candidate.profile_id, "accepted");
        assert!(rank(&[verdict("rejected", None)]).is_none());
        assert!(rank(&[]).is_none());
    }
}
