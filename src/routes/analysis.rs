use crate::models::{AnalysisRequest, AnalysisResponse, AppState, DownloadRequest, ErrorResponse};
use crate::routes::ApiError;
use crate::types::DownloadOutcome;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-analysis", post(generate_analysis))
        .route("/api/documents/download", post(download_document))
        .with_state(state)
}

/// The single endpoint driving the dashboard: catalog briefs when
/// `live_scrape` is off, the full orchestrator otherwise.
async fn generate_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    info!(
        search_text = %request.search_text,
        live_scrape = request.live_scrape,
        "analysis request received"
    );

    if !request.live_scrape {
        return match state.catalog.lookup(&request.search_text) {
            Some(record) => Ok(Json(AnalysisResponse::from_catalog(record))),
            None => Err(ApiError {
                status: StatusCode::NOT_FOUND,
                body: ErrorResponse {
                    error: format!(
                        "Topic '{}' is not in the knowledge base. Enable live_scrape to run a \
                         web analysis, or pick one of the available topics.",
                        request.search_text.trim()
                    ),
                    available_topics: Some(state.catalog.topic_names()),
                },
            }),
        };
    }

    let result = state
        .engine
        .analyze(&request.search_text, request.result_limit, request.directive)
        .await?;
    Ok(Json(AnalysisResponse::from_live(result)))
}

async fn download_document(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<DownloadOutcome>, ApiError> {
    info!(url = %request.url, "download request received");
    let doc = crate::types::DocumentRef {
        title: request.title,
        url: request.url,
    };
    let outcome = state.engine.download_artifact(&doc).await?;
    Ok(Json(outcome))
}
