// Canonicalizes raw names and profile identifiers into comparable tokens.

use std::sync::LazyLock;

use regex::Regex;

/// Surname particles that may be present on one side of a comparison and
/// absent on the other.
pub const NAME_PREFIXES: &[&str] = &["van", "de", "der", "den", "von", "zu", "ter", "ten"];

/// Platform-assigned disambiguator at the end of a profile id, e.g. `-a812ba194`.
static DISAMBIGUATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-[0-9a-f]{6,}$").expect("valid regex"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\s\-]").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    /// Empty when the name has a single part.
    pub last: String,
}

/// Lower-case, keep only `[a-z]`, whitespace and `-`, collapse whitespace, trim.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = DISALLOWED_RE.replace_all(&lower, "");
    WHITESPACE_RE.replace_all(&kept, " ").trim().to_string()
}

pub fn split_name(normalized: &str) -> NameParts {
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    NameParts {
        first: parts.first().map(|p| p.to_string()).unwrap_or_default(),
        last: if parts.len() > 1 {
            parts[parts.len() - 1].to_string()
        } else {
            String::new()
        },
    }
}

/// Split normalized text into tokens on whitespace and hyphens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Strip the trailing disambiguator from a profile id and split it into
/// normalized name parts.
///
/// `"sam-schalkwijk-22687b99"` → `["sam", "schalkwijk"]`
pub fn split_profile_id(identifier: &str) -> Vec<String> {
    let trimmed = identifier.trim().trim_matches('/');
    let decoded = urlencoding::decode(trimmed)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| trimmed.to_string());
    let stripped = DISAMBIGUATOR_RE.replace(&decoded, "");
    tokenize(&normalize(&stripped))
}

pub fn is_name_prefix(token: &str) -> bool {
    NAME_PREFIXES.contains(&token)
}

pub fn without_prefixes<S: AsRef<str>>(tokens: &[S]) -> Vec<&str> {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !is_name_prefix(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_digits() {
        assert_eq!(normalize("  Sam   O'Neil-Smith 3rd "), "sam oneil-smith rd");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("Cees\tvan  de\nHaar"), "cees van de haar");
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert_eq!(normalize("  123 !! "), "");
    }

    #[test]
    fn split_name_single_part_has_no_last() {
        let parts = split_name("cees");
        assert_eq!(parts.first, "cees");
        assert_eq!(parts.last, "");
    }

    #[test]
    fn split_name_uses_final_part_as_last() {
        let parts = split_name("cees van de haar");
        assert_eq!(parts.first, "cees");
        assert_eq!(parts.last, "haar");
    }

    #[test]
    fn split_profile_id_strips_hex_suffix() {
        assert_eq!(split_profile_id("sam-schalkwijk-22687b99"), vec!["sam", "schalkwijk"]);
        assert_eq!(split_profile_id("sam-s-a812ba194"), vec!["sam", "s"]);
    }

    #[test]
    fn split_profile_id_strips_decimal_suffix() {
        assert_eq!(split_profile_id("sam-stevens-44112233"), vec!["sam", "stevens"]);
    }

    #[test]
    fn split_profile_id_keeps_short_suffix() {
        assert_eq!(split_profile_id("jan-de-vries-12"), vec!["jan", "de", "vries"]);
    }

    #[test]
    fn split_profile_id_discards_empty_parts() {
        assert_eq!(split_profile_id("/jan--bakker/"), vec!["jan", "bakker"]);
    }

    #[test]
    fn split_profile_id_decodes_percent_escapes() {
        assert_eq!(split_profile_id("j%C3%B6rg-muller"), vec!["jrg", "muller"]);
    }

    #[test]
    fn prefixes_are_removed() {
        let tokens = vec!["jan".to_string(), "van".to_string(), "der".to_string(), "berg".to_string()];
        assert_eq!(without_prefixes(&tokens), vec!["jan", "berg"]);
    }
}
