// Queryable view of a rendered search-results page.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::provider::ResultLayout;

/// Elements whose text never reaches the rendered page.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const CHALLENGE_ELEMENTS: &str = "#captcha, #b_captcha";
const CHALLENGE_PHRASES: &[&str] = &["captcha", "unusual traffic"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// Absolute target, resolved against the page URL when relative.
    pub href: String,
    pub text: String,
}

/// One organic result with its separate display-URL element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock {
    pub cite: String,
    pub title_href: Option<String>,
    pub title_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub links: Vec<Hyperlink>,
    pub results: Vec<ResultBlock>,
    /// Visible body text, whitespace-collapsed.
    pub text: String,
    challenge_element: bool,
}

impl PageContent {
    pub fn parse(html: &str, page_url: &str, layout: &ResultLayout) -> Self {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        Self {
            url: page_url.to_string(),
            title: select_text(&document, "title"),
            links: collect_links(&document, base.as_ref()),
            results: collect_results(&document, base.as_ref(), layout),
            text: visible_text(&document),
            challenge_element: Selector::parse(CHALLENGE_ELEMENTS)
                .map(|sel| document.select(&sel).next().is_some())
                .unwrap_or(false),
        }
    }

    /// Whether this is an anti-automation interstitial instead of results.
    pub fn is_challenge(&self) -> bool {
        if self.challenge_element {
            return true;
        }
        let lower = self.text.to_lowercase();
        CHALLENGE_PHRASES.iter().any(|phrase| lower.contains(phrase))
    }
}

/// Resolve a raw href against the page URL, dropping the fragment.
fn resolve_href(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty()
        || raw.starts_with('#')
        || raw.starts_with("javascript:")
        || raw.starts_with("mailto:")
    {
        return None;
    }
    let mut parsed = if raw.starts_with("http://") || raw.starts_with("https://") {
        Url::parse(raw).ok()?
    } else {
        base?.join(raw).ok()?
    };
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn select_text(document: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

fn collect_links(document: &Html, base: Option<&Url>) -> Vec<Hyperlink> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&anchor)
        .filter_map(|el| {
            let href = resolve_href(el.value().attr("href")?, base)?;
            Some(Hyperlink {
                href,
                text: element_text(&el),
            })
        })
        .collect()
}

fn collect_results(document: &Html, base: Option<&Url>, layout: &ResultLayout) -> Vec<ResultBlock> {
    let (Ok(block), Ok(cite), Ok(title)) = (
        Selector::parse(layout.result_block),
        Selector::parse(layout.cite),
        Selector::parse(layout.title_link),
    ) else {
        return Vec::new();
    };

    document
        .select(&block)
        .map(|result| {
            let title_link = result.select(&title).next();
            ResultBlock {
                cite: result
                    .select(&cite)
                    .next()
                    .map(|el| element_text(&el))
                    .unwrap_or_default(),
                title_href: title_link
                    .and_then(|el| el.value().attr("href"))
                    .and_then(|href| resolve_href(href, base)),
                title_text: title_link.map(|el| element_text(&el)).unwrap_or_default(),
            }
        })
        .collect()
}

fn visible_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
