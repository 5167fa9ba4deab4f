//! Query Orchestrator
//!
//! Composes the scrape pipeline and the summarization client into the
//! user-facing analysis operation:
//!
//! ```text
//! analyze(term)
//!      │
//!      ▼
//! ┌─────────────┐     zero results      ┌──────────────┐
//! │  Fetching   │ ────────────────────▶ │ Failure done │
//! └─────────────┘                       └──────────────┘
//!      │ ≥1 document
//!      ▼
//! ┌─────────────┐
//! │  Enriching  │  one session, input order preserved
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐   backend error   ┌─────────────────────┐
//! │ Summarizing │ ────────────────▶ │ PartialFailure done │
//! └─────────────┘                   └─────────────────────┘
//!      │ ok
//!      ▼
//!   Success
//! ```
//!
//! Each invocation runs a single forward pass; there are no backward
//! transitions and no retries.

pub mod catalog;
pub mod insights;

pub use catalog::{TopicCatalog, TopicRecord};

use crate::browser::SessionPool;
use crate::config::Config;
use crate::llm::{FormatDirective, SummarizationError, Summarizer};
use crate::scrape::{ArtifactDownloader, DetailEnricher, ResultFetcher};
use crate::types::{
    AnalysisResult, DocumentRef, DownloadOutcome, EngineResult, EnrichedDocument, SearchQuery,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Separator between title+abstract blocks in the aggregated text.
const BLOCK_DELIMITER: &str = "\n---\n";

pub struct ResearchEngine {
    pool: Arc<SessionPool>,
    fetcher: ResultFetcher,
    enricher: DetailEnricher,
    downloader: ArtifactDownloader,
    summarizer: Summarizer,
}

impl ResearchEngine {
    pub fn new(config: &Config, pool: Arc<SessionPool>, summarizer: Summarizer) -> Self {
        Self {
            fetcher: ResultFetcher::new(&config.scraper),
            enricher: DetailEnricher::new(&config.scraper),
            downloader: ArtifactDownloader::new(&config.scraper),
            pool,
            summarizer,
        }
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    /// Run one full analysis. A session is checked out for the whole call
    /// and returned on every exit path.
    pub async fn analyze(
        &self,
        term: &str,
        result_limit: Option<usize>,
        directive: FormatDirective,
    ) -> EngineResult<AnalysisResult> {
        // Validation happens before any session is touched.
        let query = SearchQuery::new(term, result_limit)?;
        info!(term = query.term(), limit = query.result_limit(), "analysis started");

        let session = self.pool.checkout().await?;

        let outcome = self.fetcher.fetch(&query, &session).await?;
        if outcome.documents.is_empty() {
            let mut explanation = format!("No documents found for '{}'.", query.term());
            if let Some(reason) = outcome.reason {
                explanation.push_str(&format!(" ({})", reason));
            }
            info!(term = query.term(), "analysis finished without documents");
            return Ok(AnalysisResult::failure(query, explanation));
        }

        let documents = self.enricher.enrich_all(outcome.documents, &session).await;

        let aggregated = aggregate_documents(&documents);
        match self.summarizer.synthesize(&aggregated, directive).await {
            Ok(narrative) => {
                info!(
                    term = query.term(),
                    documents = documents.len(),
                    "analysis complete"
                );
                Ok(AnalysisResult::success(query, documents, narrative))
            }
            Err(e) => {
                warn!(term = query.term(), error = %e, "summarization failed");
                let explanation = format!(
                    "Summarization is unavailable: {}. The document list below is still usable.",
                    e.message
                );
                Ok(AnalysisResult::partial_failure(query, documents, explanation))
            }
        }
    }

    /// Single-document path: bypasses fetch/enrich entirely.
    pub async fn summarize_document(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        directive: FormatDirective,
    ) -> Result<String, SummarizationError> {
        self.summarizer
            .summarize_document(data, mime_type, directive)
            .await
    }

    /// Fetch the attachment for one document on explicit user request.
    pub async fn download_artifact(&self, doc: &DocumentRef) -> EngineResult<DownloadOutcome> {
        let session = self.pool.checkout().await?;
        self.downloader.download(doc, &session).await
    }

    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

/// Title+abstract blocks in fetch order, separated by a clear delimiter.
/// Absent/failed abstracts contribute their marker text so the backend sees
/// which documents lacked usable content.
fn aggregate_documents(documents: &[EnrichedDocument]) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "Title: {}\nAbstract: {}",
                doc.title,
                doc.abstract_text.for_aggregation()
            )
        })
        .collect::<Vec<_>>()
        .join(BLOCK_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserBackend, BrowserSession, MockBrowser};
    use crate::config::{ScraperConfig, ServerConfig, SummarizerConfig};
    use crate::llm::{SummaryBackend, SummaryRequest};
    use crate::types::{AbstractText, AnalysisStatus, EngineError, Summary};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SEARCH_URL: &str = "https://nslsl.test/Search";

    fn test_config(tmp: &std::path::Path) -> Config {
        Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec![],
            },
            scraper: ScraperConfig {
                search_url: SEARCH_URL.to_string(),
                search_timeout_secs: 1,
                detail_timeout_secs: 1,
                download_timeout_secs: 1,
                download_dir: tmp.display().to_string(),
                pool_size: 1,
            },
            summarizer: SummarizerConfig {
                gemini_api_key: String::new(),
                model: "gemini-2.5-flash".to_string(),
                api_base: "http://unused.test".to_string(),
            },
        }
    }

    /// Summarization stub: records aggregated prompts, replies as told.
    struct StubSummaries {
        seen: Mutex<Vec<String>>,
        reply: Result<String, SummarizationError>,
    }

    #[async_trait]
    impl SummaryBackend for Arc<StubSummaries> {
        async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizationError> {
            self.seen.lock().unwrap().push(request.prompt.clone());
            self.reply.clone()
        }
    }

    fn stub(reply: Result<String, SummarizationError>) -> Arc<StubSummaries> {
        Arc::new(StubSummaries {
            seen: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn search_site(backend: &MockBrowser, term: &str, result_count: usize) {
        backend.register_page(
            SEARCH_URL,
            r#"<form action="/Search">
                 <input id="searchCriteria" name="searchCriteria" type="text"/>
                 <button id="btnSearchSimple" type="submit">Search</button>
               </form>"#,
        );
        let items: String = (1..=result_count)
            .map(|i| format!(r#"<a class="pubDetail" href="/NSLSL/Publication/{i}">Paper {i}</a>"#))
            .collect();
        backend.register_page(
            &format!("https://nslsl.test/Search?searchCriteria={term}"),
            &format!(r#"<div id="searchResultList">{items}</div>"#),
        );
    }

    fn engine_with(
        backend: Arc<MockBrowser>,
        summaries: Arc<StubSummaries>,
        tmp: &std::path::Path,
    ) -> ResearchEngine {
        let pool = SessionPool::new(vec![BrowserSession::new(
            0,
            backend as Arc<dyn BrowserBackend>,
        )]);
        ResearchEngine::new(
            &test_config(tmp),
            pool,
            Summarizer::new(Box::new(summaries)),
        )
    }

    #[tokio::test]
    async fn empty_term_fails_fast() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = engine_with(
            Arc::new(MockBrowser::new()),
            stub(Ok("unused".to_string())),
            tmp.path(),
        );
        let result = engine.analyze("   ", None, FormatDirective::default()).await;
        assert!(matches!(result, Err(EngineError::InvalidQuery(_))));
        // Fail-fast means the session was never checked out.
        assert_eq!(engine.pool().available(), 1);
    }

    #[tokio::test]
    async fn zero_results_is_a_failure_result() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        search_site(&backend, "xyzzynotopic123", 0);

        let summaries = stub(Ok("unused".to_string()));
        let engine = engine_with(Arc::clone(&backend), Arc::clone(&summaries), tmp.path());

        let result = engine
            .analyze("xyzzynotopic123", None, FormatDirective::default())
            .await
            .unwrap();

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.documents.is_empty());
        assert!(result.summary.text().contains("No documents found for 'xyzzynotopic123'"));
        // Summarization is never attempted without documents.
        assert!(summaries.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_bad_detail_page_still_reaches_summarization() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        search_site(&backend, "quantum", 3);
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            r#"<span id="abstract-1">quantum effects on cells</span>"#,
        );
        // Publication 2 renders without any abstract section.
        backend.register_page("https://nslsl.test/NSLSL/Publication/2", "<h1>bare page</h1>");
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/3",
            r#"<span id="abstract-3">quantum dosimetry results</span>"#,
        );

        let summaries = stub(Ok("a synthesis".to_string()));
        let engine = engine_with(Arc::clone(&backend), Arc::clone(&summaries), tmp.path());

        let result = engine
            .analyze("quantum", None, FormatDirective::default())
            .await
            .unwrap();

        assert_eq!(result.status, AnalysisStatus::Success);
        assert_eq!(result.documents.len(), 3);
        assert_eq!(
            result
                .documents
                .iter()
                .filter(|d| d.abstract_text == AbstractText::Absent)
                .count(),
            1
        );
        // Order equals fetch order regardless of per-document outcomes.
        let titles: Vec<_> = result.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Paper 1", "Paper 2", "Paper 3"]);

        // The aggregated prompt carried both real abstracts and the marker.
        let prompts = summaries.seen.lock().unwrap();
        assert!(prompts[0].contains("quantum effects on cells"));
        assert!(prompts[0].contains("quantum dosimetry results"));
        assert!(prompts[0].contains("no abstract available"));
    }

    #[tokio::test]
    async fn summarization_failure_downgrades_to_partial() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        search_site(&backend, "quantum", 2);
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            r#"<div class="abstract">one</div>"#,
        );
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/2",
            r#"<div class="abstract">two</div>"#,
        );

        let summaries = stub(Err(SummarizationError::new(
            "the summarization backend is rate limiting requests; try again in a moment",
        )));
        let engine = engine_with(backend, summaries, tmp.path());

        let result = engine
            .analyze("quantum", None, FormatDirective::default())
            .await
            .unwrap();

        assert_eq!(result.status, AnalysisStatus::PartialFailure);
        assert_eq!(result.documents.len(), 2);
        assert!(matches!(result.summary, Summary::Unavailable(_)));
        assert!(result.summary.text().contains("rate limiting"));
    }

    #[tokio::test]
    async fn session_returns_to_pool_after_analysis() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBrowser::new());
        search_site(&backend, "quantum", 0);

        let engine = engine_with(backend, stub(Ok("unused".to_string())), tmp.path());
        engine
            .analyze("quantum", None, FormatDirective::default())
            .await
            .unwrap();
        assert_eq!(engine.pool().available(), 1);
    }

    #[test]
    fn aggregation_preserves_order_and_delimits_blocks() {
        let documents = vec![
            EnrichedDocument {
                title: "A".to_string(),
                url: "https://x/1".to_string(),
                abstract_text: AbstractText::Found("alpha".to_string()),
            },
            EnrichedDocument {
                title: "B".to_string(),
                url: "https://x/2".to_string(),
                abstract_text: AbstractText::Failed("timeout".to_string()),
            },
        ];
        let text = aggregate_documents(&documents);
        let a = text.find("Title: A").unwrap();
        let b = text.find("Title: B").unwrap();
        assert!(a < b);
        assert!(text.contains(BLOCK_DELIMITER));
        assert!(text.contains("error retrieving abstract: timeout"));
    }
}
