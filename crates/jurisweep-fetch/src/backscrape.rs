//! Chunked historical backfill over one adapter.
//!
//! The window is partitioned with the adapter's interval, one request is
//! issued per chunk, and results are merged. A failing chunk is reported and
//! never stops the others.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use jurisweep_core::{CaseRecord, ConfigError, DateChunk, dedup_records, partition};
use jurisweep_sites::{Adapter, SiteConfig};
use tracing::{debug, info, warn};

use crate::{Fetch, ScrapeError};

/// Overall `[start, end]` backfill range, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackscrapeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BackscrapeWindow {
    /// Fill in missing bounds: start from the site's first opinion date, end
    /// at `today`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        config: &SiteConfig,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let start = start.unwrap_or(config.first_opinion_date);
        let end = end.unwrap_or(today);
        if start > end {
            return Err(ConfigError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug)]
pub struct ChunkFailure {
    pub chunk: DateChunk,
    pub error: ScrapeError,
}

#[derive(Debug, Default)]
pub struct BackscrapeReport {
    /// Deduplicated, sorted by date then name.
    pub records: Vec<CaseRecord>,
    pub chunks: usize,
    pub failures: Vec<ChunkFailure>,
}

pub struct Backscraper<'a, F: Fetch> {
    adapter: &'a dyn Adapter,
    fetcher: &'a F,
}

impl<'a, F: Fetch> Backscraper<'a, F> {
    pub fn new(adapter: &'a dyn Adapter, fetcher: &'a F) -> Self {
        Self { adapter, fetcher }
    }

    /// Scrape every chunk of `window`, with at most `concurrency` in flight.
    ///
    /// Only invalid configuration is an error; chunk failures land in the
    /// report.
    pub async fn run(
        &self,
        window: BackscrapeWindow,
        concurrency: usize,
    ) -> Result<BackscrapeReport, ConfigError> {
        let config = self.adapter.config();
        let chunks = partition(window.start, window.end, config.interval_days)?;
        let total = chunks.len();
        info!(
            court = config.court_id,
            start = %window.start,
            end = %window.end,
            chunks = total,
            "starting backscrape"
        );

        let results: Vec<(DateChunk, Result<Vec<CaseRecord>, ScrapeError>)> = stream::iter(chunks)
            .map(|chunk| async move { (chunk, self.scrape_chunk(&chunk).await) })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut report = BackscrapeReport {
            chunks: total,
            ..Default::default()
        };
        let mut records = Vec::new();
        for (chunk, result) in results {
            match result {
                Ok(found) => records.extend(found),
                Err(error) => {
                    warn!(court = config.court_id, %chunk, error = %error, "chunk failed");
                    report.failures.push(ChunkFailure { chunk, error });
                }
            }
        }

        // Completion order is arbitrary under concurrency.
        records.sort_by(|a, b| {
            (a.date_filed, &a.name, &a.url).cmp(&(b.date_filed, &b.name, &b.url))
        });
        report.records = dedup_records(records);
        report.failures.sort_by_key(|f| f.chunk.start());

        info!(
            court = config.court_id,
            records = report.records.len(),
            failed_chunks = report.failures.len(),
            "backscrape complete"
        );
        Ok(report)
    }

    async fn scrape_chunk(&self, chunk: &DateChunk) -> Result<Vec<CaseRecord>, ScrapeError> {
        let config = self.adapter.config();
        info!(court = config.court_id, %chunk, "backscraping range");
        let request = self.adapter.build_request(chunk);
        let body = self.fetcher.fetch(&request).await?;
        let parsed = self.adapter.parse(&body)?;

        let before = parsed.len();
        let records: Vec<CaseRecord> = parsed
            .into_iter()
            .filter(|r| chunk.contains(r.date_filed))
            .collect();
        if records.len() < before {
            debug!(
                court = config.court_id,
                %chunk,
                dropped = before - records.len(),
                "dropped records outside chunk"
            );
        }
        Ok(records)
    }
}

/// Regular scrape: one request for the site's most recent opinions.
pub async fn scrape_latest<F: Fetch>(
    adapter: &dyn Adapter,
    fetcher: &F,
    today: NaiveDate,
) -> Result<Vec<CaseRecord>, ScrapeError> {
    let request = adapter.latest_request(today)?;
    let body = fetcher.fetch(&request).await?;
    let records = adapter.parse(&body)?;
    info!(
        court = adapter.config().court_id,
        records = records.len(),
        "scraped latest opinions"
    );
    Ok(dedup_records(records))
}
