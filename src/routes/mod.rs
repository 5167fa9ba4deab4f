//! API Routes
//!
//! HTTP endpoints for the application:
//! - `/api/generate-analysis` - catalog lookup or live scrape-and-summarize
//! - `/api/documents/download` - attachment retrieval for one document
//! - `/api/files/summarize` - single-PDF upload summarization
//! - `/api/health` - health checks

pub mod analysis;
pub mod files;
pub mod health;

use crate::models::{AppState, ErrorResponse};
use crate::types::EngineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router. API routes share one state; CORS and
/// request tracing wrap the whole surface.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);
    Router::new()
        .merge(analysis::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(health::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = allowed_origins
        .iter()
        .filter(|o| *o != "*")
        .filter_map(|o| o.parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Error envelope for all API handlers. Whatever goes wrong, the client
/// gets a status code and a presentable message, never a bare error chain.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                available_topics: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::InvalidQuery(message) => Self::new(StatusCode::BAD_REQUEST, message),
            EngineError::SessionUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "The analysis service is temporarily unavailable; please try again shortly.",
            ),
            EngineError::Internal(message) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}
