//! Fetch layer: HTTP transport for adapter requests and the backscrape runner.

mod backscrape;
mod error;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
mod retry;

pub use backscrape::{BackscrapeReport, BackscrapeWindow, Backscraper, ChunkFailure, scrape_latest};
pub use error::{FetchError, ScrapeError};

#[cfg(feature = "http")]
pub use http::HttpFetcher;
#[cfg(feature = "http")]
pub use retry::RetryPolicy;

use async_trait::async_trait;
use jurisweep_sites::FetchRequest;

/// Transport seam: execute one adapter request and return the body.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError>;
}
