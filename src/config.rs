use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Entry page of the publications search site.
    pub search_url: String,
    /// Bound on the wait for the search results container.
    pub search_timeout_secs: u64,
    /// Per-document bound on abstract retrieval.
    pub detail_timeout_secs: u64,
    /// Bound on the attachment HTTP fetch.
    pub download_timeout_secs: u64,
    /// Where downloaded attachments and debug snapshots land.
    pub download_dir: String,
    /// Number of concurrently usable browser sessions.
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub gemini_api_key: String,
    pub model: String,
    /// Overridable for tests; defaults to the public Gemini endpoint.
    pub api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8050".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            scraper: ScraperConfig {
                search_url: env::var("NSLSL_SEARCH_URL")
                    .unwrap_or_else(|_| "https://extapps.ksc.nasa.gov/NSLSL/Search".to_string()),
                search_timeout_secs: env::var("SEARCH_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()?,
                detail_timeout_secs: env::var("DETAIL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()?,
                download_timeout_secs: env::var("DOWNLOAD_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
                download_dir: env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string()),
                pool_size: env::var("BROWSER_POOL_SIZE")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()?,
            },
            summarizer: SummarizerConfig {
                gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
                api_base: env::var("GEMINI_API_BASE").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta".to_string()
                }),
            },
        })
    }
}
