// Summarization abstraction layer

pub mod gemini;
pub mod provider;

pub use gemini::GeminiBackend;
pub use provider::{
    BinaryAttachment, FormatDirective, SummarizationError, Summarizer, SummaryBackend,
    SummaryRequest,
};
