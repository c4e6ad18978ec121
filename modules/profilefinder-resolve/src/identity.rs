use std::sync::LazyLock;

use profilefinder_common::{ResolveError, Result};
use regex::Regex;
use serde::Serialize;

use crate::normalize::{normalize, split_name};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse runs of whitespace to a single space and trim.
pub fn clean_input(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, " ").trim().to_string()
}

/// The person being searched for. Fixed for the duration of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    display_name: String,
    first_name: String,
    last_name: String,
    tokens: Vec<String>,
    employer: Option<String>,
    source_email: Option<String>,
}

impl Identity {
    pub fn new(display_name: &str) -> Result<Self> {
        let display_name = clean_input(display_name);
        let normalized = normalize(&display_name);
        if normalized.is_empty() {
            return Err(ResolveError::InvalidIdentity(format!(
                "display name {display_name:?} has no letters"
            )));
        }

        let parts = split_name(&normalized);
        Ok(Self {
            display_name,
            first_name: parts.first,
            last_name: parts.last,
            tokens: normalized.split_whitespace().map(String::from).collect(),
            employer: None,
            source_email: None,
        })
    }

    pub fn with_employer(mut self, employer: Option<&str>) -> Self {
        self.employer = employer.map(clean_input).filter(|e| !e.is_empty());
        self
    }

    pub fn with_email(mut self, email: Option<&str>) -> Self {
        self.source_email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Empty for single-token names.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn has_surname(&self) -> bool {
        !self.last_name.is_empty()
    }

    /// Normalized whitespace-delimited name tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn employer(&self) -> Option<&str> {
        self.employer.as_deref()
    }

    pub fn source_email(&self) -> Option<&str> {
        self.source_email.as_deref()
    }

    /// True when the display name is a single word, e.g. just a first name.
    pub fn is_bare_name(&self) -> bool {
        !self.display_name.contains(' ')
    }
}
