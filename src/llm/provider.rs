//! Summarization Client: adapter boundary to the generative-AI backend.
//!
//! `Summarizer` owns prompt construction for the two input modes and hides
//! the provider behind the `SummaryBackend` trait. Backends convert every
//! transport or response-shape failure into `SummarizationError`; nothing
//! provider-specific leaks upstream.

use async_trait::async_trait;

/// A summarization failure with a message fit for display.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct SummarizationError {
    pub message: String,
}

impl SummarizationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Recognized formatting instructions. The chosen wording is embedded
/// verbatim into the instruction sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatDirective {
    #[default]
    ExecutiveSummary,
    BulletPoints,
    ShortParagraph,
    DetailedReport,
}

impl FormatDirective {
    pub fn as_instruction(&self) -> &'static str {
        match self {
            FormatDirective::ExecutiveSummary => "executive summary (200 words)",
            FormatDirective::BulletPoints => "3 concise bullet points",
            FormatDirective::ShortParagraph => "one short paragraph",
            FormatDirective::DetailedReport => "detailed report (500 words)",
        }
    }
}

/// A binary document passed through to the backend unmodified.
#[derive(Debug, Clone)]
pub struct BinaryAttachment {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Provider-neutral request: an instruction pair plus an optional attachment.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub attachment: Option<BinaryAttachment>,
}

#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizationError>;
}

const SYNTHESIS_SYSTEM_INSTRUCTION: &str = "You are a research synthesis specialist. You are \
    given titles and abstracts collected from a space life sciences publication search. \
    Write factual, evidence-based prose without conversational remarks.";

const DOCUMENT_SYSTEM_INSTRUCTION: &str = "You are an expert document summarization specialist. \
    Your task is to provide a concise, accurate summary of the provided document. Focus on key \
    findings, main arguments, and conclusions. Do not add conversational remarks.";

pub struct Summarizer {
    backend: Box<dyn SummaryBackend>,
}

impl Summarizer {
    pub fn new(backend: Box<dyn SummaryBackend>) -> Self {
        Self { backend }
    }

    /// Mode (a): synthesize across aggregated title+abstract blocks. The
    /// prompt asks for cross-document structure, which the single-document
    /// mode deliberately does not.
    pub async fn synthesize(
        &self,
        aggregated: &str,
        directive: FormatDirective,
    ) -> Result<String, SummarizationError> {
        let prompt = format!(
            "The following are search results (titles and abstracts, separated by '---') \
             from a space life sciences publication search.\n\n{}\n\n\
             Synthesize these results in a {} format. Identify recurring themes, notable \
             findings, and candidate knowledge gaps across the abstracts.",
            aggregated,
            directive.as_instruction()
        );
        let request = SummaryRequest {
            system_instruction: SYNTHESIS_SYSTEM_INSTRUCTION.to_string(),
            prompt,
            attachment: None,
        };
        self.backend.generate(&request).await
    }

    /// Mode (b): summarize one uploaded binary document.
    pub async fn summarize_document(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        directive: FormatDirective,
    ) -> Result<String, SummarizationError> {
        let request = SummaryRequest {
            system_instruction: DOCUMENT_SYSTEM_INSTRUCTION.to_string(),
            prompt: format!(
                "Summarize the uploaded document in a {} format.",
                directive.as_instruction()
            ),
            attachment: Some(BinaryAttachment {
                data,
                mime_type: mime_type.to_string(),
            }),
        };
        self.backend.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Backend stub that records the request and returns a canned reply.
    struct Recording {
        seen: Mutex<Vec<SummaryRequest>>,
        reply: Result<String, SummarizationError>,
    }

    impl Recording {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                reply: Ok(text.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                reply: Err(SummarizationError::new(message)),
            })
        }
    }

    #[async_trait]
    impl SummaryBackend for Arc<Recording> {
        async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizationError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn synthesis_prompt_embeds_directive_and_text() {
        let backend = Recording::replying("done");
        let summarizer = Summarizer::new(Box::new(Arc::clone(&backend)));

        let out = summarizer
            .synthesize(
                "Title: A\nAbstract: aa\n---\nTitle: B\nAbstract: bb",
                FormatDirective::BulletPoints,
            )
            .await
            .unwrap();
        assert_eq!(out, "done");

        let seen = backend.seen.lock().unwrap();
        let request = &seen[0];
        assert!(request.prompt.contains("3 concise bullet points"));
        assert!(request.prompt.contains("Abstract: bb"));
        assert!(request.prompt.contains("knowledge gaps"));
        assert!(request.attachment.is_none());
    }

    #[tokio::test]
    async fn document_prompt_is_distinct_from_synthesis() {
        let backend = Recording::replying("summary");
        let summarizer = Summarizer::new(Box::new(Arc::clone(&backend)));

        summarizer
            .summarize_document(vec![1, 2, 3], "application/pdf", FormatDirective::default())
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap();
        let request = &seen[0];
        assert!(request.prompt.contains("executive summary (200 words)"));
        // Single-document mode does not ask for cross-document structure.
        assert!(!request.prompt.contains("recurring themes"));
        let attachment = request.attachment.as_ref().unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(attachment.data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn backend_failure_propagates_as_summarization_error() {
        let backend = Recording::failing("backend exploded");
        let summarizer = Summarizer::new(Box::new(Arc::clone(&backend)));

        let err = summarizer
            .synthesize("text", FormatDirective::ShortParagraph)
            .await
            .unwrap_err();
        assert_eq!(err.message, "backend exploded");
    }
}
