//! Session pool with exclusive checkout.
//!
//! A browser session is single-threaded state, so two concurrent analyze
//! calls must never touch the same one. Sessions are checked out for the
//! full duration of a call and returned on drop, success and failure paths
//! alike. A session is health-checked (reset to a blank page) at checkout,
//! which also covers sessions abandoned mid-navigation by a cancelled call.

use crate::browser::{BrowserBackend, BrowserError, ElementHandle};
use crate::types::{EngineError, EngineResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

/// One checked-out-able automation session.
pub struct BrowserSession {
    id: usize,
    backend: Arc<dyn BrowserBackend>,
}

impl BrowserSession {
    pub fn new(id: usize, backend: Arc<dyn BrowserBackend>) -> Self {
        Self { id, backend }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.backend.navigate(url).await
    }

    pub async fn current_url(&self) -> Result<String, BrowserError> {
        self.backend.current_url().await
    }

    pub async fn page_source(&self) -> Result<String, BrowserError> {
        self.backend.page_source().await
    }

    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, BrowserError> {
        self.backend.wait_for_element(selector, timeout).await
    }

    pub async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        self.backend.find_elements(selector).await
    }

    pub async fn read_text(&self, element: &ElementHandle) -> Result<String, BrowserError> {
        self.backend.read_text(element).await
    }

    pub async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.backend.read_attribute(element, name).await
    }

    pub async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), BrowserError> {
        self.backend.fill(element, value).await
    }

    pub async fn click(&self, element: &ElementHandle) -> Result<(), BrowserError> {
        self.backend.click(element).await
    }

    pub async fn reset(&self) -> Result<(), BrowserError> {
        self.backend.reset().await
    }

    pub async fn close(&self) -> Result<(), BrowserError> {
        self.backend.close().await
    }
}

pub struct SessionPool {
    free: Mutex<Vec<BrowserSession>>,
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl SessionPool {
    pub fn new(sessions: Vec<BrowserSession>) -> Arc<Self> {
        let size = sessions.len();
        assert!(size > 0, "session pool needs at least one session");
        Arc::new(Self {
            free: Mutex::new(sessions),
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        })
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Check a session out for the duration of one call. Blocks until one
    /// is free; the guard returns it on drop.
    pub async fn checkout(self: &Arc<Self>) -> EngineResult<SessionGuard> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EngineError::SessionUnavailable("session pool is shut down".to_string()))?;

        let session = self
            .free
            .lock()
            .expect("pool free list poisoned")
            .pop()
            .expect("permit held but no free session");

        // Health check before handing out: whatever the previous caller left
        // the session on, it starts from a blank page.
        if let Err(e) = session.reset().await {
            warn!(session = session.id(), error = %e, "session failed health check");
            self.free
                .lock()
                .expect("pool free list poisoned")
                .push(session);
            drop(permit);
            return Err(EngineError::SessionUnavailable(e.to_string()));
        }

        Ok(SessionGuard {
            session: Some(session),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Close every session and refuse further checkouts. Waits for
    /// checked-out sessions to come back first.
    pub async fn shutdown(&self) {
        let Ok(permits) = self.semaphore.acquire_many(self.size as u32).await else {
            return;
        };
        let sessions: Vec<BrowserSession> = self
            .free
            .lock()
            .expect("pool free list poisoned")
            .drain(..)
            .collect();
        for session in sessions {
            if let Err(e) = session.close().await {
                warn!(session = session.id(), error = %e, "session close failed");
            }
        }
        // Close before releasing the held permits so no waiter can slip in
        // and pop from the drained free list.
        self.semaphore.close();
        drop(permits);
        info!(size = self.size, "session pool shut down");
    }
}

/// RAII checkout of one session. Derefs to [`BrowserSession`]; the session
/// goes back to the pool when the guard drops.
pub struct SessionGuard {
    session: Option<BrowserSession>,
    pool: Arc<SessionPool>,
    _permit: OwnedSemaphorePermit,
}

impl std::ops::Deref for SessionGuard {
    type Target = BrowserSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref().expect("session taken before drop")
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool
                .free
                .lock()
                .expect("pool free list poisoned")
                .push(session);
        }
        // The permit drops with the guard, waking the next waiter.
    }
}
