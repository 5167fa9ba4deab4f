use crate::llm::FormatDirective;
use crate::models::{AppState, SummarizeFileResponse};
use crate::routes::ApiError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use tracing::info;

const DEFAULT_MIME: &str = "application/pdf";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files/summarize", post(summarize_file))
        .with_state(state)
}

/// Single-PDF upload path: the binary goes straight to the summarization
/// backend, bypassing fetch and enrichment.
async fn summarize_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeFileResponse>, ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut directive = FormatDirective::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("malformed upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("document.pdf")
                    .to_string();
                let mime = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| {
                        mime_guess::from_path(&filename)
                            .first()
                            .map(|m| m.to_string())
                    })
                    .unwrap_or_else(|| DEFAULT_MIME.to_string());
                let data = field.bytes().await.map_err(|e| {
                    ApiError::new(
                        StatusCode::BAD_REQUEST,
                        format!("could not read uploaded file: {}", e),
                    )
                })?;
                file = Some((filename, mime, data.to_vec()));
            }
            Some("directive") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::new(StatusCode::BAD_REQUEST, format!("malformed directive: {}", e))
                })?;
                directive = parse_directive(&text)?;
            }
            _ => {}
        }
    }

    let (filename, mime, data) = file.ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "missing 'file' field in upload")
    })?;
    if data.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "uploaded file is empty"));
    }

    info!(filename = %filename, bytes = data.len(), "summarizing uploaded document");
    let summary = state
        .engine
        .summarize_document(data, &mime, directive)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.message))?;

    Ok(Json(SummarizeFileResponse {
        filename,
        directive,
        summary,
    }))
}

/// Only the recognized directive names are accepted; the text is never
/// interpreted beyond that.
fn parse_directive(text: &str) -> Result<FormatDirective, ApiError> {
    serde_json::from_value(serde_json::Value::String(text.trim().to_string())).map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!(
                "unrecognized directive '{}'; expected one of: executive_summary, \
                 bullet_points, short_paragraph, detailed_report",
                text.trim()
            ),
        )
    })
}
