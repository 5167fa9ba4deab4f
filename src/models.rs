// Shared application state and HTTP-facing request/response shapes.

use crate::config::Config;
use crate::engine::catalog::{
    ActionableInsight, ExperimentCount, GraphElement, KnowledgeGap, TopicRecord,
};
use crate::engine::{insights, ResearchEngine, TopicCatalog};
use crate::llm::FormatDirective;
use crate::types::{AnalysisResult, AnalysisStatus, EnrichedDocument, Summary};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<ResearchEngine>,
    pub catalog: Arc<TopicCatalog>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AnalysisRequest {
    pub search_text: String,
    #[serde(default)]
    pub live_scrape: bool,
    pub result_limit: Option<usize>,
    #[serde(default)]
    pub directive: FormatDirective,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Catalog,
    LiveScrape,
}

/// One response shape for both paths, so the dashboard renders catalog
/// briefs and live analyses identically.
#[derive(Debug, serde::Serialize)]
pub struct AnalysisResponse {
    pub request_id: uuid::Uuid,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub source: AnalysisSource,
    pub status: AnalysisStatus,
    pub summary: Summary,
    pub documents: Vec<EnrichedDocument>,
    pub experiments: Vec<ExperimentCount>,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub actionable: Vec<ActionableInsight>,
    pub graph_elements: Vec<GraphElement>,
}

/// Keywords shown per live analysis; matches the catalog graphs in size.
const LIVE_KEYWORD_COUNT: usize = 10;

impl AnalysisResponse {
    pub fn from_catalog(record: &TopicRecord) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            title: format!("Knowledge Base Analysis for: '{}'", record.topic),
            source: AnalysisSource::Catalog,
            status: AnalysisStatus::Success,
            summary: Summary::Narrative(record.summary.clone()),
            documents: Vec::new(),
            experiments: record.experiments.clone(),
            knowledge_gaps: record.knowledge_gaps.clone(),
            actionable: record.actionable.clone(),
            graph_elements: record.graph_elements.clone(),
        }
    }

    pub fn from_live(result: AnalysisResult) -> Self {
        let keywords =
            insights::extract_keywords(&insights::corpus_of(&result.documents), LIVE_KEYWORD_COUNT);
        Self {
            request_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            title: format!("Live Web Analysis for: '{}'", result.query.term()),
            source: AnalysisSource::LiveScrape,
            status: result.status,
            summary: result.summary,
            documents: result.documents,
            experiments: insights::keyword_rows(&keywords),
            knowledge_gaps: Vec::new(),
            actionable: Vec::new(),
            graph_elements: insights::keyword_graph(&keywords),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DownloadRequest {
    pub title: String,
    pub url: String,
}

#[derive(Debug, serde::Serialize)]
pub struct SummarizeFileResponse {
    pub filename: String,
    pub directive: FormatDirective,
    pub summary: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub sessions_available: usize,
    pub sessions_total: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_topics: Option<Vec<String>>,
}
