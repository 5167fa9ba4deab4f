use spacelit::browser::{BrowserBackend, BrowserSession, HttpBrowser, SessionPool};
use spacelit::engine::TopicCatalog;
use spacelit::llm::{GeminiBackend, Summarizer};
use spacelit::{create_router, AppState, Config, ResearchEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spacelit=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);
    if config.summarizer.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; summarization will report as unavailable");
    }

    // One automation session per pool slot; each owns its own HTTP client.
    let request_timeout = Duration::from_secs(config.scraper.search_timeout_secs);
    let sessions = (0..config.scraper.pool_size)
        .map(|i| {
            BrowserSession::new(
                i,
                Arc::new(HttpBrowser::new(request_timeout)) as Arc<dyn BrowserBackend>,
            )
        })
        .collect();
    let pool = SessionPool::new(sessions);

    let summarizer = Summarizer::new(Box::new(GeminiBackend::from_config(&config.summarizer)));
    let engine = Arc::new(ResearchEngine::new(&config, pool, summarizer));

    let state = AppState {
        config: config.clone(),
        engine: Arc::clone(&engine),
        catalog: Arc::new(TopicCatalog::builtin()),
    };

    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    // Sessions are torn down on every exit path that gets here, including
    // ctrl-c; the pool waits for checked-out sessions to come back first.
    engine.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not install shutdown handler: {}", e);
    }
}
