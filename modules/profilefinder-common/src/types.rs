use serde::{Deserialize, Serialize};

// --- Candidates ---

/// Which extraction strategy discovered a candidate.
///
/// Declaration order is precedence order: when two strategies find the same
/// profile, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    DirectLink,
    RedirectDecoded,
    CiteText,
    PatternGuess,
    PageTextScan,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::DirectLink => write!(f, "direct_link"),
            Provenance::RedirectDecoded => write!(f, "redirect_decoded"),
            Provenance::CiteText => write!(f, "cite_text"),
            Provenance::PatternGuess => write!(f, "pattern_guess"),
            Provenance::PageTextScan => write!(f, "page_text_scan"),
        }
    }
}

/// A possible profile reference discovered on a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCandidate {
    /// The profile URL as discovered (or as reconstructed from an identifier).
    pub raw_url: String,
    /// Path segment identifying the profile. Never empty, never carries a
    /// query string or fragment.
    pub profile_id: String,
    /// Anchor or caption text near the reference. May be empty.
    pub display_text: String,
    pub provenance: Provenance,
}

impl ProfileCandidate {
    /// Key under which two candidates are considered the same profile.
    pub fn dedup_key(&self) -> String {
        self.profile_id.to_lowercase()
    }
}

// --- Verification ---

/// The rule that decided a verification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    FirstNameMiss,
    SingleNameExact,
    SingleNameAmbiguous,
    SingleNameMismatch,
    ExactSurname,
    SurnameInitial,
    FuzzySurname,
    DifferentSurname,
    CoreSurname,
    EmployerCorroboration,
    InsufficientMatch,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::FirstNameMiss => "first_name_miss",
            Reason::SingleNameExact => "single_name_exact",
            Reason::SingleNameAmbiguous => "single_name_ambiguous",
            Reason::SingleNameMismatch => "single_name_mismatch",
            Reason::ExactSurname => "exact_surname",
            Reason::SurnameInitial => "surname_initial",
            Reason::FuzzySurname => "fuzzy_surname",
            Reason::DifferentSurname => "different_surname",
            Reason::CoreSurname => "core_surname",
            Reason::EmployerCorroboration => "employer_corroboration",
            Reason::InsufficientMatch => "insufficient_match",
        }
    }

    /// Whether this rule accepts the candidate.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            Reason::SingleNameExact
                | Reason::ExactSurname
                | Reason::SurnameInitial
                | Reason::FuzzySurname
                | Reason::CoreSurname
                | Reason::EmployerCorroboration
        )
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub candidate: ProfileCandidate,
    pub accepted: bool,
    pub reason: Reason,
    /// Query-fit score; `Some` exactly when `accepted`.
    pub match_score: Option<u32>,
}

impl VerificationVerdict {
    pub fn accept(candidate: ProfileCandidate, reason: Reason, match_score: u32) -> Self {
        Self {
            candidate,
            accepted: true,
            reason,
            match_score: Some(match_score),
        }
    }

    pub fn reject(candidate: ProfileCandidate, reason: Reason) -> Self {
        Self {
            candidate,
            accepted: false,
            reason,
            match_score: None,
        }
    }
}
