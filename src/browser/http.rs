//! Headless HTTP + HTML-parsing browser backend.
//!
//! Fetches pages with a plain HTTP client and answers selector queries
//! against the parsed markup. This satisfies the automation contract for
//! sites whose search and detail pages are server-rendered; swapping in a
//! real driver is a matter of implementing [`BrowserBackend`] elsewhere.

use crate::browser::dom::{ClickAction, DomCore};
use crate::browser::{BrowserBackend, BrowserError, ElementHandle};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// How often a bounded wait re-checks the current page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct HttpBrowser {
    client: reqwest::Client,
    core: DomCore,
}

impl HttpBrowser {
    pub fn new(request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            core: DomCore::new(),
        }
    }

    async fn fetch_into_page(&self, url: Url) -> Result<(), BrowserError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        // The final URL may differ after redirects; hrefs resolve against it.
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url = %final_url, bytes = body.len(), "page loaded");
        self.core.load(final_url, body);
        Ok(())
    }
}

#[async_trait]
impl BrowserBackend for HttpBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.core.ensure_open()?;
        let parsed = Url::parse(url).map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.fetch_into_page(parsed).await
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        self.core.current_url()
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        self.core.page_source()
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(handle) = self.core.query_first(selector)? {
                return Ok(handle);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::WaitTimeout {
                    selector: selector.to_string(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        self.core.query(selector)
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<String, BrowserError> {
        self.core.text(element)
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.core.attr(element, name)
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), BrowserError> {
        self.core.record_fill(element, value)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), BrowserError> {
        match self.core.click_action(element)? {
            ClickAction::Navigate(url) | ClickAction::Submit(url) => {
                self.fetch_into_page(url).await
            }
        }
    }

    async fn reset(&self) -> Result<(), BrowserError> {
        self.core.reset()
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.core.close();
        Ok(())
    }
}
