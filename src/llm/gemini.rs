// Gemini adapter implementation
// Targets the generateContent REST endpoint; supports plain text prompts
// and inline binary documents (PDF upload path).
// API Reference: https://ai.google.dev/api/generate-content

use crate::config::SummarizerConfig;
use crate::llm::provider::{SummarizationError, SummaryBackend, SummaryRequest};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Matches the original integration's low-variance setting for factual
/// summaries.
const TEMPERATURE: f32 = 0.2;

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

// Request types for the Gemini API
#[derive(Serialize)]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// Response types for the Gemini API
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiBackend {
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(request: &SummaryRequest) -> GeminiRequest {
        let mut parts = Vec::new();
        if let Some(attachment) = &request.attachment {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&attachment.data),
                },
            });
        }
        parts.push(GeminiPart::Text {
            text: request.prompt.clone(),
        });

        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl SummaryBackend for GeminiBackend {
    async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizationError> {
        if self.api_key.is_empty() {
            return Err(SummarizationError::new(
                "summarization is not configured (missing GEMINI_API_KEY)",
            ));
        }

        let body = Self::build_request(request);
        debug!(model = %self.model, has_attachment = request.attachment.is_some(), "calling summarization backend");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SummarizationError::new(format!("summarization backend unreachable: {}", e))
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SummarizationError::new(
                "the summarization backend is rate limiting requests; try again in a moment",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(SummarizationError::new(format!(
                    "summarization backend error ({}): {}",
                    status, parsed.error.message
                )));
            }
            return Err(SummarizationError::new(format!(
                "summarization backend error ({})",
                status
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            SummarizationError::new(format!("malformed summarization response: {}", e))
        })?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(SummarizationError::new(
                "summarization backend returned no text",
            ));
        }
        Ok(text)
    }
}
