//! Scripted in-memory browser backend for tests.
//!
//! Pages are registered up front by URL; navigation serves them from the
//! map. A call log and failure switches let tests assert interaction order
//! and exercise dead-session and unreachable-site paths without a network.

use crate::browser::dom::{ClickAction, DomCore};
use crate::browser::{BrowserBackend, BrowserError, ElementHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Default)]
pub struct MockBrowser {
    pages: Mutex<HashMap<String, String>>,
    core: DomCore,
    calls: Mutex<Vec<String>>,
    unreachable: Mutex<bool>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` whenever the session navigates to `url`.
    pub fn register_page(&self, url: &str, html: &str) {
        self.pages
            .lock()
            .expect("pages poisoned")
            .insert(url.to_string(), html.to_string());
    }

    /// Make every navigation fail, as if the automation backend died.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().expect("flag poisoned") = unreachable;
    }

    /// Close the session out from under its users.
    pub fn kill(&self) {
        self.core.close();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls poisoned").clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls poisoned").push(call.into());
    }

    fn serve(&self, url: Url) -> Result<(), BrowserError> {
        if *self.unreachable.lock().expect("flag poisoned") {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        let html = self
            .pages
            .lock()
            .expect("pages poisoned")
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "no page registered".to_string(),
            })?;
        self.core.load(url, html);
        Ok(())
    }
}

#[async_trait]
impl BrowserBackend for MockBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.core.ensure_open()?;
        self.log(format!("navigate {}", url));
        let parsed = Url::parse(url).map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.serve(parsed)
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
        // Mock pages are static; one check decides, the timeout only shapes
        // the reported wait.
        self.log(format!("wait {}", selector));
        match self.core.query_first(selector)? {
            Some(handle) => Ok(handle),
            None => Err(BrowserError::WaitTimeout {
                selector: selector.to_string(),
                waited_ms: timeout.as_millis() as u64,
            }),
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
        self.log(format!("fill {}", value));
        self.core.record_fill(element, value)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), BrowserError> {
        match self.core.click_action(element)? {
            ClickAction::Navigate(url) | ClickAction::Submit(url) => {
                self.log(format!("click -> {}", url));
                self.serve(url)
            }
        }
    }

    async fn reset(&self) -> Result<(), BrowserError> {
        self.log("reset");
        self.core.reset()
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.log("close");
        self.core.close();
        Ok(())
    }
}
