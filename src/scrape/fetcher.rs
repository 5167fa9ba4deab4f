//! Result Fetcher: turns a search term into a bounded list of document
//! references by driving the search site's own interface.

use crate::browser::{BrowserError, BrowserSession};
use crate::config::ScraperConfig;
use crate::types::{DocumentRef, EngineError, EngineResult, SearchQuery};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const SEARCH_BOX: &str = "#searchCriteria";
const SEARCH_BUTTON: &str = "#btnSearchSimple";
const RESULTS_CONTAINER: &str = "#searchResultList";
const RESULT_LINKS: &str = "#searchResultList a.pubDetail";

/// Filename of the page snapshot written when the results never render.
const SNAPSHOT_NAME: &str = "debug_page.html";

/// What a fetch produced. An empty document list is a valid outcome, not an
/// error; `reason` says why it is empty so callers can tell "zero results"
/// from "results never rendered".
#[derive(Debug)]
pub struct FetchOutcome {
    pub documents: Vec<DocumentRef>,
    pub reason: Option<String>,
}

impl FetchOutcome {
    fn found(documents: Vec<DocumentRef>) -> Self {
        Self {
            documents,
            reason: None,
        }
    }

    fn empty(reason: impl Into<String>) -> Self {
        Self {
            documents: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

pub struct ResultFetcher {
    search_url: String,
    wait_timeout: Duration,
    snapshot_dir: PathBuf,
}

impl ResultFetcher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            search_url: config.search_url.clone(),
            wait_timeout: Duration::from_secs(config.search_timeout_secs),
            snapshot_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Submit the query and extract up to `result_limit` (title, url) pairs
    /// in the order the site presents them. Leaves the session on the
    /// results page.
    pub async fn fetch(
        &self,
        query: &SearchQuery,
        session: &BrowserSession,
    ) -> EngineResult<FetchOutcome> {
        info!(term = query.term(), url = %self.search_url, "navigating to search page");

        if let Err(e) = session.navigate(&self.search_url).await {
            return self.non_fatal(e, "search site unreachable");
        }

        let search_box = match session.wait_for_element(SEARCH_BOX, self.wait_timeout).await {
            Ok(handle) => handle,
            Err(e) => return self.handle_wait_failure(session, e, "search form").await,
        };
        if let Err(e) = session.fill(&search_box, query.term()).await {
            return self.non_fatal(e, "could not enter search term");
        }

        let button = match session.wait_for_element(SEARCH_BUTTON, self.wait_timeout).await {
            Ok(handle) => handle,
            Err(e) => return self.handle_wait_failure(session, e, "search button").await,
        };
        debug!(term = query.term(), "submitting search");
        if let Err(e) = session.click(&button).await {
            return self.non_fatal(e, "search submission failed");
        }

        if let Err(e) = session
            .wait_for_element(RESULTS_CONTAINER, self.wait_timeout)
            .await
        {
            return self.handle_wait_failure(session, e, "results container").await;
        }

        let links = match session.find_elements(RESULT_LINKS).await {
            Ok(links) => links,
            Err(e) => return self.non_fatal(e, "could not read result list"),
        };

        let base = session
            .current_url()
            .await
            .ok()
            .and_then(|u| Url::parse(&u).ok());

        let mut documents = Vec::new();
        for link in links.iter().take(query.result_limit()) {
            let title = match session.read_text(link).await {
                Ok(t) => t,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable result link");
                    continue;
                }
            };
            let href = match session.read_attribute(link, "href").await {
                Ok(Some(href)) => href,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "skipping result link without href");
                    continue;
                }
            };
            let url = match &base {
                Some(base) => match base.join(&href) {
                    Ok(abs) => abs.to_string(),
                    Err(_) => continue,
                },
                None => href,
            };
            if !title.is_empty() {
                documents.push(DocumentRef { title, url });
            }
        }

        if documents.is_empty() {
            info!(term = query.term(), "search reported zero results");
            return Ok(FetchOutcome::empty(format!(
                "the search reported no results for '{}'",
                query.term()
            )));
        }

        info!(term = query.term(), count = documents.len(), "search results extracted");
        Ok(FetchOutcome::found(documents))
    }

    /// A dead session is fatal to the whole call; anything else degrades to
    /// an empty outcome with a reason.
    fn non_fatal(&self, error: BrowserError, context: &str) -> EngineResult<FetchOutcome> {
        if matches!(error, BrowserError::SessionClosed) {
            return Err(EngineError::SessionUnavailable(error.to_string()));
        }
        warn!(error = %error, context, "search fetch failed");
        Ok(FetchOutcome::empty(format!("{}: {}", context, error)))
    }

    async fn handle_wait_failure(
        &self,
        session: &BrowserSession,
        error: BrowserError,
        waited_for: &str,
    ) -> EngineResult<FetchOutcome> {
        match error {
            BrowserError::SessionClosed => {
                Err(EngineError::SessionUnavailable("session is closed".to_string()))
            }
            BrowserError::WaitTimeout { .. } => {
                warn!(waited_for, timeout_secs = self.wait_timeout.as_secs(), "search wait timed out");
                self.write_snapshot(session).await;
                Ok(FetchOutcome::empty(format!(
                    "{} did not appear within {} s",
                    waited_for,
                    self.wait_timeout.as_secs()
                )))
            }
            other => self.non_fatal(other, waited_for),
        }
    }

    /// Best-effort page dump for diagnosing why the results never rendered.
    async fn write_snapshot(&self, session: &BrowserSession) {
        let Ok(html) = session.page_source().await else {
            return;
        };
        if let Err(e) = tokio::fs::create_dir_all(&self.snapshot_dir).await {
            warn!(error = %e, "could not create snapshot directory");
            return;
        }
        let path = self.snapshot_dir.join(SNAPSHOT_NAME);
        match tokio::fs::write(&path, html).await {
            Ok(()) => info!(path = %path.display(), "wrote debug page snapshot"),
            Err(e) => warn!(error = %e, "could not write debug page snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserBackend, BrowserSession, MockBrowser};
    use std::sync::Arc;

    const SEARCH_URL: &str = "https://nslsl.test/Search";

    fn fetcher_with(dir: &std::path::Path) -> ResultFetcher {
        ResultFetcher {
            search_url: SEARCH_URL.to_string(),
            wait_timeout: Duration::from_millis(200),
            snapshot_dir: dir.to_path_buf(),
        }
    }

    fn search_page() -> &'static str {
        r#"<form action="/Search">
             <input id="searchCriteria" name="searchCriteria" type="text"/>
             <button id="btnSearchSimple" type="submit">Search</button>
           </form>"#
    }

    fn results_page(count: usize) -> String {
        let items: String = (1..=count)
            .map(|i| {
                format!(
                    r#"<a class="pubDetail" href="/NSLSL/Publication/{i}">Paper {i}</a>"#
                )
            })
            .collect();
        format!(r#"<div id="searchResultList">{items}</div>"#)
    }

    fn session_for(backend: Arc<MockBrowser>) -> BrowserSession {
        BrowserSession::new(0, backend as Arc<dyn BrowserBackend>)
    }

    #[tokio::test]
    async fn extracts_results_in_page_order_up_to_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(SEARCH_URL, search_page());
        backend.register_page(
            "https://nslsl.test/Search?searchCriteria=quantum",
            &results_page(8),
        );

        let session = session_for(Arc::clone(&backend));
        let query = SearchQuery::new("quantum", Some(5)).unwrap();
        let outcome = fetcher_with(tmp.path()).fetch(&query, &session).await.unwrap();

        assert_eq!(outcome.documents.len(), 5);
        assert!(outcome.reason.is_none());
        assert_eq!(outcome.documents[0].title, "Paper 1");
        // Relative hrefs come back absolute, resolved against the results page.
        assert_eq!(
            outcome.documents[0].url,
            "https://nslsl.test/NSLSL/Publication/1"
        );
        assert_eq!(outcome.documents[4].title, "Paper 5");
    }

    #[tokio::test]
    async fn zero_results_is_empty_with_reason() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(SEARCH_URL, search_page());
        backend.register_page(
            "https://nslsl.test/Search?searchCriteria=xyzzynotopic123",
            &results_page(0),
        );

        let session = session_for(backend);
        let query = SearchQuery::new("xyzzynotopic123", None).unwrap();
        let outcome = fetcher_with(tmp.path()).fetch(&query, &session).await.unwrap();

        assert!(outcome.documents.is_empty());
        assert!(outcome.reason.unwrap().contains("xyzzynotopic123"));
    }

    #[tokio::test]
    async fn results_timeout_yields_empty_and_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(SEARCH_URL, search_page());
        // The submission lands on a page without the results container.
        backend.register_page(
            "https://nslsl.test/Search?searchCriteria=quantum",
            "<div id='error'>maintenance</div>",
        );

        let session = session_for(backend);
        let query = SearchQuery::new("quantum", None).unwrap();
        let outcome = fetcher_with(tmp.path()).fetch(&query, &session).await.unwrap();

        assert!(outcome.documents.is_empty());
        assert!(outcome.reason.unwrap().contains("results container"));
        assert!(tmp.path().join(SNAPSHOT_NAME).exists());
    }

    #[tokio::test]
    async fn dead_session_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        backend.kill();

        let session = session_for(backend);
        let query = SearchQuery::new("quantum", None).unwrap();
        let result = fetcher_with(tmp.path()).fetch(&query, &session).await;

        assert!(matches!(result, Err(EngineError::SessionUnavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_site_degrades_to_empty_outcome() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        backend.set_unreachable(true);

        let session = session_for(backend);
        let query = SearchQuery::new("quantum", None).unwrap();
        let outcome = fetcher_with(tmp.path()).fetch(&query, &session).await.unwrap();

        assert!(outcome.documents.is_empty());
        assert!(outcome.reason.unwrap().contains("unreachable"));
    }
}
