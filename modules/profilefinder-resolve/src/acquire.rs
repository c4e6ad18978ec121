use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentOptions, Viewport};
use profilefinder_common::AcquisitionError;

use crate::fingerprint::Fingerprint;
use crate::traits::PageSource;

/// Page acquisition through a Browserless `/content` endpoint.
pub struct BrowserlessPageSource {
    client: BrowserlessClient,
}

impl BrowserlessPageSource {
    pub fn new(client: BrowserlessClient) -> Self {
        Self { client }
    }
}

fn content_options(fingerprint: &Fingerprint, navigation_timeout: Duration) -> ContentOptions {
    ContentOptions {
        user_agent: Some(fingerprint.user_agent.clone()),
        viewport: Some(Viewport {
            width: fingerprint.viewport_width,
            height: fingerprint.viewport_height,
        }),
        navigation_timeout,
    }
}

fn map_error(err: BrowserlessError, navigation_timeout: Duration) -> AcquisitionError {
    match err {
        BrowserlessError::Timeout => AcquisitionError::Timeout(navigation_timeout),
        other => AcquisitionError::Failed(other.to_string()),
    }
}

#[async_trait]
impl PageSource for BrowserlessPageSource {
    async fn fetch(
        &self,
        url: &str,
        fingerprint: &Fingerprint,
        navigation_timeout: Duration,
    ) -> Result<String, AcquisitionError> {
        self.client
            .content(url, &content_options(fingerprint, navigation_timeout))
            .await
            .map_err(|e| map_error(e, navigation_timeout))
    }

    fn name(&self) -> &str {
        "browserless"
    }
}
