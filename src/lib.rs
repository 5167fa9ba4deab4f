// Spacelit - research analysis backend for NASA space life sciences literature

pub mod browser;
pub mod config;
pub mod engine;
pub mod llm;
pub mod models;
pub mod routes;
pub mod scrape;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use engine::ResearchEngine;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
