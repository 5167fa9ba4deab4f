//! Scraping pipeline against the publications search site.
//!
//! Three components, composed by the engine:
//! - [`fetcher::ResultFetcher`]: search term in, bounded list of
//!   (title, url) document references out.
//! - [`enricher::DetailEnricher`]: per-document abstract retrieval with
//!   contained failures.
//! - [`downloader::ArtifactDownloader`]: attachment retrieval for one
//!   document on explicit request.

pub mod downloader;
pub mod enricher;
pub mod fetcher;

pub use downloader::ArtifactDownloader;
pub use enricher::DetailEnricher;
pub use fetcher::{FetchOutcome, ResultFetcher};
