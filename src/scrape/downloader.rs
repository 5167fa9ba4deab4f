//! Artifact Downloader: retrieves a document's binary attachment.
//!
//! The attachment link is located through the browser session, but the
//! binary itself is fetched over a plain HTTP client; browser download
//! dialogs are nondeterministic and stay out of the picture.

use crate::browser::{BrowserError, BrowserSession};
use crate::config::ScraperConfig;
use crate::types::{DocumentRef, DownloadOutcome, DownloadedArtifact, EngineError, EngineResult};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Links whose target follows the site's download-path convention. When
/// several match, the first in document order is used.
const ATTACHMENT_SELECTOR: &str = "a[href*='/NSLSL/Search/Download/']";

const FALLBACK_NAME: &str = "nslsl-document";

pub struct ArtifactDownloader {
    client: reqwest::Client,
    wait_timeout: Duration,
    download_dir: PathBuf,
}

impl ArtifactDownloader {
    pub fn new(config: &ScraperConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            wait_timeout: Duration::from_secs(config.search_timeout_secs.min(15)),
            download_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Locate and fetch the attachment for one document. "No attachment" and
    /// HTTP failures are values; only a dead session is an error.
    pub async fn download(
        &self,
        doc: &DocumentRef,
        session: &BrowserSession,
    ) -> EngineResult<DownloadOutcome> {
        if let Err(e) = session.navigate(&doc.url).await {
            if matches!(e, BrowserError::SessionClosed) {
                return Err(EngineError::SessionUnavailable(e.to_string()));
            }
            return Ok(DownloadOutcome::TransportError {
                message: format!("could not open detail page: {}", e),
            });
        }

        let link = match session
            .wait_for_element(ATTACHMENT_SELECTOR, self.wait_timeout)
            .await
        {
            Ok(handle) => handle,
            Err(BrowserError::SessionClosed) => {
                return Err(EngineError::SessionUnavailable("session is closed".to_string()));
            }
            Err(BrowserError::WaitTimeout { .. }) => {
                info!(url = %doc.url, "no attachment link on detail page");
                return Ok(DownloadOutcome::NotFound { status: None });
            }
            Err(e) => {
                return Ok(DownloadOutcome::TransportError {
                    message: e.to_string(),
                })
            }
        };

        let href = match session.read_attribute(&link, "href").await {
            Ok(Some(href)) => href,
            _ => return Ok(DownloadOutcome::NotFound { status: None }),
        };
        let raw_name = session.read_text(&link).await.unwrap_or_default();

        // Resolving against the current page is mandatory; the site links
        // attachments with relative paths.
        let base = match session.current_url().await.ok().and_then(|u| Url::parse(&u).ok()) {
            Some(base) => base,
            None => {
                return Ok(DownloadOutcome::TransportError {
                    message: "no current page to resolve the attachment link against".to_string(),
                })
            }
        };
        let absolute = match base.join(&href) {
            Ok(url) => url,
            Err(e) => {
                return Ok(DownloadOutcome::TransportError {
                    message: format!("unresolvable attachment link '{}': {}", href, e),
                })
            }
        };

        let response = match self.client.get(absolute.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %absolute, error = %e, "attachment fetch failed");
                return Ok(DownloadOutcome::TransportError {
                    message: e.to_string(),
                });
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!(url = %absolute, status = status.as_u16(), "attachment fetch rejected");
            return Ok(DownloadOutcome::NotFound {
                status: Some(status.as_u16()),
            });
        }
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(DownloadOutcome::TransportError {
                    message: e.to_string(),
                })
            }
        };

        let filename = build_filename(&raw_name);
        if let Err(e) = tokio::fs::create_dir_all(&self.download_dir).await {
            return Ok(DownloadOutcome::TransportError {
                message: format!("could not create download directory: {}", e),
            });
        }
        let path = self.download_dir.join(&filename);
        if let Err(e) = tokio::fs::write(&path, &body).await {
            return Ok(DownloadOutcome::TransportError {
                message: format!("could not write {}: {}", path.display(), e),
            });
        }

        info!(path = %path.display(), bytes = body.len(), "attachment downloaded");
        Ok(DownloadOutcome::Downloaded(DownloadedArtifact {
            source_url: absolute.to_string(),
            local_path: path,
            size_bytes: body.len() as u64,
        }))
    }
}

/// Strip characters that are illegal in file paths.
fn sanitize_filename(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Sanitized name with a guaranteed document extension.
fn build_filename(raw: &str) -> String {
    let mut name = sanitize_filename(raw);
    if name.is_empty() {
        name = FALLBACK_NAME.to_string();
    }
    if mime_guess::from_path(&name).first().is_none() {
        name.push_str(".pdf");
    }
    name
}
