// Candidate extraction: independent strategies over one results page,
// unioned and deduplicated by profile id.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use profilefinder_common::{ProfileCandidate, Provenance};
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::page::PageContent;
use crate::platform::{
    find_all_profiles, find_profile, is_platform_host, profile_url, unbreadcrumb, ProfileMatch,
    PLATFORM_NAME, PROFILE_PATH,
};
use crate::provider::SearchProvider;

/// Marker in front of a base64-wrapped destination in redirect parameters.
const BASE64_MARKER: &str = "a1";

/// Profile-id shapes tried by the pattern guess, most specific first.
static GUESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"(?i)/in/([^/?#&\s"'<>…]+)"#).expect("valid regex"),
        Regex::new(r"(?i)\b([a-z]+-[a-z0-9-]*[0-9])\b").expect("valid regex"),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectLink,
    RedirectDecode,
    CiteText,
    PatternGuess,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::DirectLink,
        Strategy::RedirectDecode,
        Strategy::CiteText,
        Strategy::PatternGuess,
    ];

    fn run(&self, page: &PageContent, provider: SearchProvider) -> Vec<ProfileCandidate> {
        match self {
            Strategy::DirectLink => direct_links(page),
            Strategy::RedirectDecode => redirect_links(page, provider),
            Strategy::CiteText => cite_texts(page),
            Strategy::PatternGuess => pattern_guesses(page),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extractor {
    strategies: Vec<Strategy>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl Extractor {
    pub fn with_strategies(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// Every plausible profile reference on the page.
    ///
    /// The page-text scan only runs when no other strategy found anything.
    pub fn extract(&self, page: &PageContent, provider: SearchProvider) -> Vec<ProfileCandidate> {
        let mut merged = CandidateSet::default();
        for strategy in &self.strategies {
            let found = strategy.run(page, provider);
            debug!(strategy = ?strategy, count = found.len(), "Extraction strategy finished");
            merged.extend(found);
        }

        if merged.is_empty() {
            merged.extend(page_text_scan(page));
        }
        merged.into_vec()
    }
}

/// Candidates in first-seen order, one per profile id. A duplicate from a
/// stronger strategy takes over the slot; the caption comes from the
/// strongest strategy that had one.
#[derive(Default)]
struct CandidateSet {
    candidates: Vec<ProfileCandidate>,
    /// Provenance of each slot's current caption, `None` while it is empty.
    caption_from: Vec<Option<Provenance>>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    fn extend(&mut self, found: Vec<ProfileCandidate>) {
        for candidate in found {
            self.insert(candidate);
        }
    }

    fn insert(&mut self, mut candidate: ProfileCandidate) {
        let key = candidate.dedup_key();
        let caption_from = (!candidate.display_text.is_empty()).then_some(candidate.provenance);
        let Some(slot) = self.index.get(&key).copied() else {
            self.index.insert(key, self.candidates.len());
            self.candidates.push(candidate);
            self.caption_from.push(caption_from);
            return;
        };

        let takes_caption = match (caption_from, self.caption_from[slot]) {
            (Some(incoming), Some(current)) => incoming < current,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let existing = &mut self.candidates[slot];
        let display_text = if takes_caption {
            self.caption_from[slot] = caption_from;
            std::mem::take(&mut candidate.display_text)
        } else {
            std::mem::take(&mut existing.display_text)
        };
        if candidate.provenance < existing.provenance {
            *existing = candidate;
        }
        existing.display_text = display_text;
    }

    fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn into_vec(self) -> Vec<ProfileCandidate> {
        self.candidates
    }
}

/// Ids lifted from hrefs arrive percent-encoded, ids read from rendered
/// text do not.
fn decoded_id(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|id| id.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn candidate(found: ProfileMatch, display_text: &str, provenance: Provenance) -> ProfileCandidate {
    ProfileCandidate {
        raw_url: found.url,
        profile_id: decoded_id(&found.profile_id),
        display_text: display_text.trim().to_string(),
        provenance,
    }
}

// --- Strategies ---

fn direct_links(page: &PageContent) -> Vec<ProfileCandidate> {
    page.links
        .iter()
        .filter(|link| {
            Url::parse(&link.href).is_ok_and(|url| {
                url.host_str().is_some_and(is_platform_host) && url.path().starts_with(PROFILE_PATH)
            })
        })
        .filter_map(|link| {
            let found = find_profile(&link.href)?;
            Some(candidate(found, &link.text, Provenance::DirectLink))
        })
        .collect()
}

fn redirect_links(page: &PageContent, provider: SearchProvider) -> Vec<ProfileCandidate> {
    page.links
        .iter()
        .filter(|link| provider.is_redirect(&link.href))
        .filter_map(|link| {
            let destination = decode_redirect(&link.href, provider)?;
            let found = find_profile(&destination)?;
            Some(candidate(found, &link.text, Provenance::RedirectDecoded))
        })
        .collect()
}

/// Recover the wrapped destination of a redirect link. `None` when nothing
/// decodes to a profile URL.
pub fn decode_redirect(href: &str, provider: SearchProvider) -> Option<String> {
    if let Ok(url) = Url::parse(href) {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        for param in provider.redirect_params() {
            let Some((_, value)) = pairs.iter().find(|(key, _)| key == param) else {
                continue;
            };
            if find_profile(value).is_some() {
                return Some(value.clone());
            }
            if let Some(decoded) = value.strip_prefix(BASE64_MARKER).and_then(decode_base64) {
                if find_profile(&decoded).is_some() {
                    return Some(decoded);
                }
            }
        }

        if let Some((_, value)) = pairs.iter().find(|(_, value)| find_profile(value).is_some()) {
            return Some(value.clone());
        }
    }

    let decoded = urlencoding::decode(href).ok()?;
    find_profile(&decoded).map(|_| decoded.into_owned())
}

fn decode_base64(encoded: &str) -> Option<String> {
    // Form decoding turns '+' into ' '.
    let encoded = encoded.trim().replace(' ', "+");
    [URL_SAFE_NO_PAD, URL_SAFE, STANDARD_NO_PAD, STANDARD]
        .iter()
        .find_map(|engine| engine.decode(&encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

fn cite_texts(page: &PageContent) -> Vec<ProfileCandidate> {
    page.results
        .iter()
        .filter_map(|result| {
            let cite = unbreadcrumb(&result.cite);
            let found = find_profile(&cite)?;
            // Truncated display URLs carry a partial id.
            if cite.contains(&format!("{}…", found.profile_id)) {
                return None;
            }
            Some(candidate(found, &result.title_text, Provenance::CiteText))
        })
        .collect()
}

fn pattern_guesses(page: &PageContent) -> Vec<ProfileCandidate> {
    page.results
        .iter()
        .filter(|result| result.title_text.to_lowercase().contains(PLATFORM_NAME))
        .filter_map(|result| {
            let href = result.title_href.as_deref().unwrap_or_default();
            let profile_id = guess_profile_id(href, &result.title_text)?;
            Some(ProfileCandidate {
                raw_url: profile_url(&profile_id),
                profile_id,
                display_text: result.title_text.clone(),
                provenance: Provenance::PatternGuess,
            })
        })
        .collect()
}

fn guess_profile_id(href: &str, text: &str) -> Option<String> {
    GUESS_PATTERNS.iter().find_map(|pattern| {
        [href, text].into_iter().find_map(|source| {
            let captures = pattern.captures(source)?;
            let id = captures.get(1)?.as_str();
            (!id.is_empty()).then(|| decoded_id(id))
        })
    })
}

fn page_text_scan(page: &PageContent) -> Vec<ProfileCandidate> {
    find_all_profiles(&unbreadcrumb(&page.text))
        .into_iter()
        .map(|found| candidate(found, "", Provenance::PageTextScan))
        .collect()
}
