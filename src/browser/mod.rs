//! Browser automation boundary.
//!
//! The `BrowserBackend` trait abstracts every page interaction the scrape
//! pipeline needs, so the orchestrator never depends on a specific
//! automation product. Implementors:
//!
//! - [`HttpBrowser`]: headless HTTP + HTML-parsing backend (reqwest +
//!   scraper); the production default.
//! - [`MockBrowser`]: scripted in-memory backend for tests.
//!
//! A session is single-threaded state (current page, pending form fields)
//! and must never be shared across concurrent logical requests; the
//! [`pool::SessionPool`] enforces exclusive checkout.

pub mod dom;
pub mod http;
pub mod mock;
pub mod pool;

pub use http::HttpBrowser;
pub use mock::MockBrowser;
pub use pool::{BrowserSession, SessionGuard, SessionPool};

use async_trait::async_trait;
use std::time::Duration;

/// Opaque reference to an element captured from the current page. Handles
/// are invalidated by any navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle {
    pub(crate) id: u64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BrowserError {
    #[error("session is closed")]
    SessionClosed,

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {waited_ms} ms waiting for '{selector}'")]
    WaitTimeout { selector: String, waited_ms: u64 },

    #[error("invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("stale element handle")]
    StaleElement,

    #[error("element is not interactable: {0}")]
    NotInteractable(String),

    #[error("no page loaded")]
    NoPage,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Primitive operations a browser-automation backend must support.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    /// Load the given URL and make it the current page.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// URL of the current page.
    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Full markup of the current page, for debug snapshots.
    async fn page_source(&self) -> Result<String, BrowserError>;

    /// Wait (bounded) for the first element matching `selector` to appear.
    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, BrowserError>;

    /// All elements currently matching `selector`, in document order.
    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Rendered text content of an element.
    async fn read_text(&self, element: &ElementHandle) -> Result<String, BrowserError>;

    /// An attribute value, or `None` when the attribute is missing.
    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Enter a value into a form field.
    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), BrowserError>;

    /// Click an element (follows links, submits forms).
    async fn click(&self, element: &ElementHandle) -> Result<(), BrowserError>;

    /// Return the session to a known blank page.
    async fn reset(&self) -> Result<(), BrowserError>;

    /// Tear the session down; all further calls fail with `SessionClosed`.
    async fn close(&self) -> Result<(), BrowserError>;
}
