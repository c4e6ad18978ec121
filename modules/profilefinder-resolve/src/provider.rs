use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::platform::QUERY_KEYWORD;

/// CSS selectors for a provider's organic result blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLayout {
    pub result_block: &'static str,
    /// Separate display-URL element inside a block.
    pub cite: &'static str,
    pub title_link: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchProvider {
    Bing,
    Google,
}

impl SearchProvider {
    pub fn name(&self) -> &'static str {
        match self {
            SearchProvider::Bing => "bing",
            SearchProvider::Google => "google",
        }
    }

    pub fn host(&self) -> &'static str {
        match self {
            SearchProvider::Bing => "www.bing.com",
            SearchProvider::Google => "www.google.com",
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("https://{}/search?q={}", self.host(), urlencoding::encode(query))
    }

    pub fn layout(&self) -> ResultLayout {
        match self {
            SearchProvider::Bing => ResultLayout {
                result_block: "li.b_algo",
                cite: "cite",
                title_link: "h2 a",
            },
            SearchProvider::Google => ResultLayout {
                result_block: "div.g",
                cite: "cite",
                title_link: "a",
            },
        }
    }

    /// Path prefix of the click-tracking redirector.
    pub fn redirect_path(&self) -> &'static str {
        match self {
            SearchProvider::Bing => "/ck/",
            SearchProvider::Google => "/url",
        }
    }

    /// Query parameters that may carry the wrapped destination.
    pub fn redirect_params(&self) -> &'static [&'static str] {
        match self {
            SearchProvider::Bing => &["u"],
            SearchProvider::Google => &["q", "url"],
        }
    }

    /// Whether a link points at this provider's own redirect endpoint.
    pub fn is_redirect(&self, href: &str) -> bool {
        let Ok(url) = url::Url::parse(href) else {
            return false;
        };
        let host_matches = url.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            host == self.host() || host == self.host().trim_start_matches("www.")
        });
        host_matches && url.path().starts_with(self.redirect_path())
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bing" => Some(SearchProvider::Bing),
            "google" => Some(SearchProvider::Google),
            _ => None,
        }
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the query text is phrased for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryVariant {
    /// `<name> <employer> LinkedIn`
    WithEmployer,
    /// `<name> LinkedIn`
    WithoutEmployer,
    /// `site:linkedin.com/in/ <name> <employer>`
    SiteScoped,
}

impl QueryVariant {
    pub fn name(&self) -> &'static str {
        match self {
            QueryVariant::WithEmployer => "with_employer",
            QueryVariant::WithoutEmployer => "without_employer",
            QueryVariant::SiteScoped => "site_scoped",
        }
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn build_query(identity: &Identity, variant: QueryVariant) -> String {
    let name = identity.display_name();
    match (variant, identity.employer()) {
        (QueryVariant::WithEmployer, Some(employer)) => format!("{name} {employer} {QUERY_KEYWORD}"),
        (QueryVariant::WithEmployer | QueryVariant::WithoutEmployer, _) => {
            format!("{name} {QUERY_KEYWORD}")
        }
        (QueryVariant::SiteScoped, Some(employer)) => format!("site:linkedin.com/in/ {name} {employer}"),
        (QueryVariant::SiteScoped, None) => format!("site:linkedin.com/in/ {name}"),
    }
}

/// One entry in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStep {
    pub provider: SearchProvider,
    pub variant: QueryVariant,
}

impl ResolutionStep {
    pub const fn new(provider: SearchProvider, variant: QueryVariant) -> Self {
        Self { provider, variant }
    }
}

/// Primary provider with and without the employer, then the optional
/// fallback provider with the employer and site-scoped.
pub fn default_chain(fallback: Option<SearchProvider>) -> Vec<ResolutionStep> {
    let mut chain = vec![
        ResolutionStep::new(SearchProvider::Bing, QueryVariant::WithEmployer),
        ResolutionStep::new(SearchProvider::Bing, QueryVariant::WithoutEmployer),
    ];
    if let Some(provider) = fallback {
        chain.push(ResolutionStep::new(provider, QueryVariant::WithEmployer));
        chain.push(ResolutionStep::new(provider, QueryVariant::SiteScoped));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_with_employer() {
        let identity = Identity::new("Sam Schalkwijk").unwrap().with_employer(Some("Acme"));
        assert_eq!(
            build_query(&identity, QueryVariant::WithEmployer),
            "Sam Schalkwijk Acme LinkedIn"
        );
        assert_eq!(
            build_query(&identity, QueryVariant::WithoutEmployer),
            "Sam Schalkwijk LinkedIn"
        );
        assert_eq!(
            build_query(&identity, QueryVariant::SiteScoped),
            "site:linkedin.com/in/ Sam Schalkwijk Acme"
        );
    }

    #[test]
    fn query_without_employer_collapses_variants() {
        let identity = Identity::new("Sam Schalkwijk").unwrap();
        assert_eq!(
            build_query(&identity, QueryVariant::WithEmployer),
            build_query(&identity, QueryVariant::WithoutEmployer)
        );
    }

    #[test]
    fn search_url_is_encoded() {
        assert_eq!(
            SearchProvider::Bing.search_url("Sam Schalkwijk LinkedIn"),
            "https://www.bing.com/search?q=Sam%20Schalkwijk%20LinkedIn"
        );
    }

    #[test]
    fn recognizes_redirect_links() {
        assert!(SearchProvider::Bing.is_redirect("https://www.bing.com/ck/a?!&&p=abc&u=a1aHR0cHM"));
        assert!(!SearchProvider::Bing.is_redirect("https://www.linkedin.com/in/sam"));
        assert!(SearchProvider::Google.is_redirect("https://www.google.com/url?q=https://x"));
        assert!(!SearchProvider::Google.is_redirect("https://www.bing.com/ck/a?u=x"));
    }

    #[test]
    fn default_chain_shape() {
        assert_eq!(default_chain(None).len(), 2);
        let chain = default_chain(Some(SearchProvider::Google));
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[1], ResolutionStep::new(SearchProvider::Bing, QueryVariant::WithoutEmployer));
        assert_eq!(chain[3].variant, QueryVariant::SiteScoped);
    }

    #[test]
    fn parses_provider_names() {
        assert_eq!(SearchProvider::parse(" Google "), Some(SearchProvider::Google));
        assert_eq!(SearchProvider::parse("duckduckgo"), None);
    }
}
