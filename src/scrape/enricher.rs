//! Detail Enricher: augments document references with abstracts.

use crate::browser::{BrowserError, BrowserSession};
use crate::config::ScraperConfig;
use crate::types::{AbstractText, DocumentRef, EnrichedDocument};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Candidate abstract locations, most specific first. The first locator that
/// yields non-empty text wins; list order is the tie-break, not page order.
const ABSTRACT_LOCATORS: &[&str] = &[
    "span[id^='abstract-']",
    "div#abstract p",
    "div.abstract",
    "p[id$='lblAbstract']",
];

pub struct DetailEnricher {
    per_document_timeout: Duration,
}

impl DetailEnricher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            per_document_timeout: Duration::from_secs(config.detail_timeout_secs),
        }
    }

    /// Enrich one document. Never fails: problems land in the abstract slot
    /// as `Absent` or `Failed` markers.
    pub async fn enrich(&self, doc: DocumentRef, session: &BrowserSession) -> EnrichedDocument {
        debug!(url = %doc.url, "navigating to detail page");
        if let Err(e) = session.navigate(&doc.url).await {
            warn!(url = %doc.url, error = %e, "detail page navigation failed");
            return EnrichedDocument::new(doc, AbstractText::Failed(e.to_string()));
        }

        let per_locator = self.per_document_timeout / ABSTRACT_LOCATORS.len() as u32;
        for locator in ABSTRACT_LOCATORS {
            match session.wait_for_element(locator, per_locator).await {
                Ok(handle) => match session.read_text(&handle).await {
                    Ok(text) if !text.is_empty() => {
                        debug!(url = %doc.url, locator, "abstract found");
                        return EnrichedDocument::new(doc, AbstractText::Found(text));
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        return EnrichedDocument::new(doc, AbstractText::Failed(e.to_string()));
                    }
                },
                Err(BrowserError::WaitTimeout { .. }) => continue,
                Err(e) => {
                    warn!(url = %doc.url, error = %e, "abstract lookup failed");
                    return EnrichedDocument::new(doc, AbstractText::Failed(e.to_string()));
                }
            }
        }

        debug!(url = %doc.url, "no abstract located");
        EnrichedDocument::new(doc, AbstractText::Absent)
    }

    /// Enrich a batch, one result per input, in input order. A single
    /// document's failure never aborts the batch.
    pub async fn enrich_all(
        &self,
        docs: Vec<DocumentRef>,
        session: &BrowserSession,
    ) -> Vec<EnrichedDocument> {
        let total = docs.len();
        let mut enriched = Vec::with_capacity(total);
        for (i, doc) in docs.into_iter().enumerate() {
            debug!(index = i + 1, total, "enriching document");
            enriched.push(self.enrich(doc, session).await);
        }
        let found = enriched
            .iter()
            .filter(|d| d.abstract_text.is_found())
            .count();
        info!(total, with_abstract = found, "enrichment complete");
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserBackend, MockBrowser};
    use std::sync::Arc;

    fn enricher() -> DetailEnricher {
        DetailEnricher {
            per_document_timeout: Duration::from_millis(200),
        }
    }

    fn session_for(backend: Arc<MockBrowser>) -> BrowserSession {
        BrowserSession::new(0, backend as Arc<dyn BrowserBackend>)
    }

    fn doc(i: usize) -> DocumentRef {
        DocumentRef {
            title: format!("Paper {i}"),
            url: format!("https://nslsl.test/NSLSL/Publication/{i}"),
        }
    }

    #[tokio::test]
    async fn first_matching_locator_wins() {
        let backend = Arc::new(MockBrowser::new());
        // Both locators present; the span variant is earlier in the list.
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            r#"<div class="abstract">from div</div>
               <span id="abstract-1">from span</span>"#,
        );

        let session = session_for(backend);
        let enriched = enricher().enrich(doc(1), &session).await;
        assert_eq!(
            enriched.abstract_text,
            AbstractText::Found("from span".to_string())
        );
    }

    #[tokio::test]
    async fn missing_abstract_is_absent_not_failed() {
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            "<h1>Publication</h1><p>no abstract sections here</p>",
        );

        let session = session_for(backend);
        let enriched = enricher().enrich(doc(1), &session).await;
        assert_eq!(enriched.abstract_text, AbstractText::Absent);
    }

    #[tokio::test]
    async fn batch_contains_failures_per_document() {
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            r#"<span id="abstract-1">first abstract</span>"#,
        );
        // Publication 2 is not registered: its navigation fails.
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/3",
            r#"<span id="abstract-3">third abstract</span>"#,
        );

        let session = session_for(backend);
        let docs = vec![doc(1), doc(2), doc(3)];
        let enriched = enricher().enrich_all(docs, &session).await;

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].title, "Paper 1");
        assert!(enriched[0].abstract_text.is_found());
        assert!(matches!(enriched[1].abstract_text, AbstractText::Failed(_)));
        assert!(enriched[2].abstract_text.is_found());
        // Order matches input order regardless of per-document outcomes.
        assert_eq!(enriched[2].title, "Paper 3");
    }

    #[tokio::test]
    async fn enrich_is_idempotent_against_static_page() {
        let backend = Arc::new(MockBrowser::new());
        backend.register_page(
            "https://nslsl.test/NSLSL/Publication/1",
            r#"<div class="abstract">stable text</div>"#,
        );

        let session = session_for(backend);
        let first = enricher().enrich(doc(1), &session).await;
        let second = enricher().enrich(doc(1), &session).await;
        assert_eq!(first.abstract_text, second.abstract_text);
    }
}
