pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Slack added on top of the navigation timeout for the HTTP round trip itself.
const TRANSPORT_SLACK: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Per-request rendering options forwarded to Browserless.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub user_agent: Option<String>,
    pub viewport: Option<Viewport>,
    pub navigation_timeout: Duration,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            viewport: None,
            navigation_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    timeout: u64,
    wait_until: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewport: Option<Viewport>,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// Fetch fully-rendered HTML for a URL via the Browserless /content endpoint.
    pub async fn content(&self, url: &str, options: &ContentOptions) -> Result<String> {
        let body = ContentRequest {
            url,
            goto_options: GotoOptions {
                timeout: options.navigation_timeout.as_millis() as u64,
                wait_until: "domcontentloaded",
            },
            user_agent: options.user_agent.as_deref(),
            viewport: options.viewport,
        };

        debug!(url, timeout_ms = body.goto_options.timeout, "browserless: requesting content");

        let resp = self
            .client
            .post(self.endpoint())
            .timeout(options.navigation_timeout + TRANSPORT_SLACK)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::REQUEST_TIMEOUT {
            return Err(BrowserlessError::Timeout);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}
