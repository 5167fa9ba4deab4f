// Core domain types for the research query pipeline.

use std::path::PathBuf;

/// A validated search submission. Construction is the only place the term
/// is trimmed and checked, so downstream code can rely on it being non-empty.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchQuery {
    term: String,
    result_limit: usize,
}

/// Default number of results requested per search.
pub const DEFAULT_RESULT_LIMIT: usize = 10;
/// Upper bound on results per search, matching the source site's page size.
pub const MAX_RESULT_LIMIT: usize = 25;

impl SearchQuery {
    pub fn new(term: &str, result_limit: Option<usize>) -> Result<Self, EngineError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(EngineError::InvalidQuery(
                "search term must not be empty".to_string(),
            ));
        }
        let result_limit = result_limit
            .unwrap_or(DEFAULT_RESULT_LIMIT)
            .clamp(1, MAX_RESULT_LIMIT);
        Ok(Self {
            term: term.to_string(),
            result_limit,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }
}

/// Reference to one publication in the search results. Identity is the URL;
/// titles are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentRef {
    pub title: String,
    pub url: String,
}

/// Outcome of abstract retrieval for one document.
///
/// `Absent` means the detail page rendered but no abstract could be located;
/// `Failed` means retrieval itself went wrong. The two must stay
/// distinguishable for the UI and for summarization prompts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum AbstractText {
    Found(String),
    Absent,
    Failed(String),
}

impl AbstractText {
    pub fn is_found(&self) -> bool {
        matches!(self, AbstractText::Found(_))
    }

    /// Text to feed into the aggregation step. Markers are spelled out so the
    /// summarization backend sees which documents lacked usable abstracts.
    pub fn for_aggregation(&self) -> String {
        match self {
            AbstractText::Found(text) => text.clone(),
            AbstractText::Absent => "[no abstract available for this document]".to_string(),
            AbstractText::Failed(reason) => {
                format!("[error retrieving abstract: {}]", reason)
            }
        }
    }
}

/// A `DocumentRef` augmented with its abstract. Read-only after creation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EnrichedDocument {
    pub title: String,
    pub url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: AbstractText,
}

impl EnrichedDocument {
    pub fn new(doc: DocumentRef, abstract_text: AbstractText) -> Self {
        Self {
            title: doc.title,
            url: doc.url,
            abstract_text,
        }
    }
}

/// A binary attachment written to local storage by the downloader.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DownloadedArtifact {
    pub source_url: String,
    pub local_path: PathBuf,
    pub size_bytes: u64,
}

/// Result of an attachment download attempt. "No attachment" is an expected,
/// common case and is a value, not an error.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Downloaded(DownloadedArtifact),
    NotFound {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
    TransportError {
        message: String,
    },
}

/// Narrative summary slot of an analysis. `Unavailable` carries the formatted
/// explanation shown in place of a summary (no documents, backend failure).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Summary {
    Narrative(String),
    Unavailable(String),
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Narrative(t) | Summary::Unavailable(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Success,
    PartialFailure,
    Failure,
}

/// The immutable outcome of one orchestration run.
///
/// Constructors enforce the status invariants: `Success` requires documents
/// and a narrative, `PartialFailure` requires documents, `Failure` means no
/// documents were found at all.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisResult {
    pub query: SearchQuery,
    pub documents: Vec<EnrichedDocument>,
    pub summary: Summary,
    pub status: AnalysisStatus,
}

impl AnalysisResult {
    pub fn success(query: SearchQuery, documents: Vec<EnrichedDocument>, narrative: String) -> Self {
        debug_assert!(!documents.is_empty());
        Self {
            query,
            documents,
            summary: Summary::Narrative(narrative),
            status: AnalysisStatus::Success,
        }
    }

    pub fn partial_failure(
        query: SearchQuery,
        documents: Vec<EnrichedDocument>,
        explanation: String,
    ) -> Self {
        debug_assert!(!documents.is_empty());
        Self {
            query,
            documents,
            summary: Summary::Unavailable(explanation),
            status: AnalysisStatus::PartialFailure,
        }
    }

    pub fn failure(query: SearchQuery, explanation: String) -> Self {
        Self {
            query,
            documents: Vec::new(),
            summary: Summary::Unavailable(explanation),
            status: AnalysisStatus::Failure,
        }
    }
}

/// Errors that terminate a whole engine call. Per-document problems never
/// surface here; they are contained in `AbstractText` / `DownloadOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Browser session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trims_and_rejects_empty() {
        let q = SearchQuery::new("  quantum  ", None).unwrap();
        assert_eq!(q.term(), "quantum");
        assert_eq!(q.result_limit(), DEFAULT_RESULT_LIMIT);

        assert!(matches!(
            SearchQuery::new("   ", None),
            Err(EngineError::InvalidQuery(_))
        ));
    }

    #[test]
    fn query_clamps_result_limit() {
        assert_eq!(SearchQuery::new("x", Some(0)).unwrap().result_limit(), 1);
        assert_eq!(
            SearchQuery::new("x", Some(500)).unwrap().result_limit(),
            MAX_RESULT_LIMIT
        );
        assert_eq!(SearchQuery::new("x", Some(5)).unwrap().result_limit(), 5);
    }

    #[test]
    fn abstract_markers_stay_distinguishable() {
        assert_ne!(
            AbstractText::Absent,
            AbstractText::Failed("timeout".to_string())
        );
        assert!(AbstractText::Found("text".to_string()).is_found());
        assert!(AbstractText::Absent
            .for_aggregation()
            .contains("no abstract available"));
        assert!(AbstractText::Failed("timeout".to_string())
            .for_aggregation()
            .contains("error retrieving abstract"));
    }

    #[test]
    fn failure_result_has_no_documents() {
        let q = SearchQuery::new("xyzzynotopic123", None).unwrap();
        let result = AnalysisResult::failure(q, "No documents found".to_string());
        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.documents.is_empty());
        assert!(matches!(result.summary, Summary::Unavailable(_)));
    }
}
