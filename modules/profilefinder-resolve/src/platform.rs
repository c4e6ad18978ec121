// The professional network whose profile URLs we resolve.

use std::sync::LazyLock;

use regex::Regex;

pub const CANONICAL_HOST: &str = "www.linkedin.com";
pub const PROFILE_PATH: &str = "/in/";
/// Term appended to search queries to steer results toward profiles.
pub const QUERY_KEYWORD: &str = "LinkedIn";
/// Lower-cased platform name as it appears in result titles.
pub const PLATFORM_NAME: &str = "linkedin";

/// A profile URL anywhere in a string: optional scheme, optional subdomain,
/// then `linkedin.com/in/<id>`.
static PROFILE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?://)?(?:[a-z0-9-]+\.)*linkedin\.com/in/([^/?#&\s"'<>…]+)"#)
        .expect("valid regex")
});

/// Breadcrumb separators used in rendered display URLs ("linkedin.com › in › sam").
static BREADCRUMB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*›\s*").expect("valid regex"));

/// A profile reference located inside some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMatch {
    /// The matched URL text as it appeared.
    pub url: String,
    pub profile_id: String,
}

pub fn find_profile(text: &str) -> Option<ProfileMatch> {
    PROFILE_URL_RE.captures(text).map(|cap| ProfileMatch {
        url: cap[0].to_string(),
        profile_id: cap[1].to_string(),
    })
}

pub fn find_all_profiles(text: &str) -> Vec<ProfileMatch> {
    PROFILE_URL_RE
        .captures_iter(text)
        .map(|cap| ProfileMatch {
            url: cap[0].to_string(),
            profile_id: cap[1].to_string(),
        })
        .collect()
}

/// Rewrite breadcrumb display URLs into slash-separated paths.
pub fn unbreadcrumb(text: &str) -> String {
    BREADCRUMB_RE.replace_all(text, "/").into_owned()
}

pub fn is_platform_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "linkedin.com" || host.ends_with(".linkedin.com")
}

/// Build a profile URL on the canonical host from a bare identifier.
pub fn profile_url(profile_id: &str) -> String {
    format!("https://{CANONICAL_HOST}{PROFILE_PATH}{profile_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_profile_in_full_url() {
        let m = find_profile("https://nl.linkedin.com/in/sam-schalkwijk-22687b99?trk=abc").unwrap();
        assert_eq!(m.url, "https://nl.linkedin.com/in/sam-schalkwijk-22687b99");
        assert_eq!(m.profile_id, "sam-schalkwijk-22687b99");
    }

    #[test]
    fn finds_profile_without_scheme() {
        let m = find_profile("see linkedin.com/in/jan-bakker for more").unwrap();
        assert_eq!(m.url, "linkedin.com/in/jan-bakker");
        assert_eq!(m.profile_id, "jan-bakker");
    }

    #[test]
    fn stops_at_fragment_and_path() {
        let m = find_profile("https://www.linkedin.com/in/jan-bakker/details#top").unwrap();
        assert_eq!(m.profile_id, "jan-bakker");
    }

    #[test]
    fn stops_at_truncation_ellipsis() {
        let m = find_profile("https://nl.linkedin.com/in/sam-schalk…").unwrap();
        assert_eq!(m.profile_id, "sam-schalk");
    }

    #[test]
    fn ignores_company_pages() {
        assert!(find_profile("https://www.linkedin.com/company/acme").is_none());
    }

    #[test]
    fn breadcrumbs_become_paths() {
        let cite = unbreadcrumb("https://nl.linkedin.com › in › sam-schalkwijk");
        assert_eq!(cite, "https://nl.linkedin.com/in/sam-schalkwijk");
        assert_eq!(find_profile(&cite).unwrap().profile_id, "sam-schalkwijk");
    }

    #[test]
    fn platform_hosts() {
        assert!(is_platform_host("www.linkedin.com"));
        assert!(is_platform_host("NL.LinkedIn.com"));
        assert!(is_platform_host("linkedin.com"));
        assert!(!is_platform_host("notlinkedin.com"));
        assert!(!is_platform_host("www.bing.com"));
    }

    #[test]
    fn finds_every_profile() {
        let text = "linkedin.com/in/a-one and https://be.linkedin.com/in/b-two";
        let ids: Vec<String> = find_all_profiles(text).into_iter().map(|m| m.profile_id).collect();
        assert_eq!(ids, vec!["a-one", "b-two"]);
    }
}
