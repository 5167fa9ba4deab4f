use crate::models::{AppState, HealthResponse};
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = state.engine.pool();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sessions_available: pool.available(),
        sessions_total: pool.capacity(),
    })
}
