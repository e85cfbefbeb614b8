use chrono::NaiveDate;
use jurisweep_core::{CaseRecord, ConfigError, DateChunk, RecordError};
use thiserror::Error;
use tracing::warn;
use url::form_urlencoded;

use crate::SiteConfig;

/// The whole document was unusable. Individual bad result nodes are not
/// reported here; they are skipped by [`collect_records`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One outbound GET, fully specified by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub verify_tls: bool,
}

impl FetchRequest {
    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string form-encoded onto it, for logging.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let qs = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{}", self.url, qs)
    }
}

/// A court site: turns date ranges into requests and responses into records.
///
/// Implementations hold only their immutable [`SiteConfig`], so one instance
/// can serve any number of concurrent chunk cycles.
pub trait Adapter: Send + Sync {
    fn config(&self) -> &SiteConfig;

    /// Request scoped to one backscrape chunk.
    fn build_request(&self, chunk: &DateChunk) -> FetchRequest;

    /// Request for the regular scrape of recent opinions.
    ///
    /// Defaults to the chunk request for the trailing interval ending `today`.
    fn latest_request(&self, today: NaiveDate) -> Result<FetchRequest, ConfigError> {
        let window = self.config().trailing_window(today)?;
        Ok(self.build_request(&window))
    }

    /// Parse a fetched document. Malformed result nodes are skipped.
    fn parse(&self, document: &str) -> Result<Vec<CaseRecord>, ParseError>;
}

/// Run `extract` over every node, keeping the successes.
///
/// A node that fails is logged with its position and dropped; it never stops
/// the remaining nodes from being processed.
pub fn collect_records<N, F>(court_id: &str, nodes: impl IntoIterator<Item = N>, extract: F) -> Vec<CaseRecord>
where
    F: Fn(N) -> Result<CaseRecord, RecordError>,
{
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, node) in nodes.into_iter().enumerate() {
        match extract(node) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!(court = court_id, index, error = %e, "skipping malformed result");
            }
        }
    }
    if skipped > 0 {
        warn!(court = court_id, kept = records.len(), skipped, "parsed with skipped results");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use jurisweep_core::Status;

    #[test]
    fn full_url_encodes_query() {
        let req = FetchRequest {
            url: "https://mn.gov/law-library/search/".into(),
            query: vec![
                ("v:sources".into(), "mn-law-library-opinions".into()),
                ("query".into(), " (url:/archive/supct) ".into()),
            ],
            headers: vec![],
            verify_tls: false,
        };
        assert_eq!(
            req.full_url(),
            "https://mn.gov/law-library/search/?v%3Asources=mn-law-library-opinions&query=+%28url%3A%2Farchive%2Fsupct%29+"
        );
        assert_eq!(req.param("query"), Some(" (url:/archive/supct) "));
        assert_eq!(req.param("missing"), None);
    }

    #[test]
    fn full_url_without_query() {
        let req = FetchRequest {
            url: "https://example.test/".into(),
            query: vec![],
            headers: vec![],
            verify_tls: true,
        };
        assert_eq!(req.full_url(), "https://example.test/");
    }

    #[test]
    fn collect_records_skips_failures() {
        let nodes = vec![Some("a"), None, Some("b")];
        let records = collect_records("test", nodes, |n| {
            let name = n.ok_or(RecordError::MissingField("name"))?;
            Ok(CaseRecord {
                court_id: "test".into(),
                date_filed: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                name: name.into(),
                url: format!("https://example.test/{name}"),
                docket: String::new(),
                disposition: String::new(),
                summary: String::new(),
                status: Status::Unknown,
                judge: None,
            })
        });
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
