//! Minnesota appellate opinions via the State Law Library search.
//!
//! One adapter serves the Supreme Court and both Court of Appeals archives;
//! they differ only in the archive path queried and the fixed status.
//!
//! Results are HTML `div.searchresult` nodes:
//!
//! ```text
//! <div class="searchresult">
//!   <a href="//mn.gov/law-library-stat/archive/supct/2024/OPA231234-080724.pdf">
//!     In re Doe. A23-1234</a>
//!   <div class="searchresult_snippet">... Affirmed.</div>
//!   <div class="searchresult_date">Filed: August 7, 2024</div>
//! </div>
//! ```

use chrono::NaiveDate;
use jurisweep_core::{CaseRecord, ConfigError, DateChunk, RecordError, Status};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{Adapter, FetchRequest, ParseError, SiteConfig, StatusPolicy, collect_records};

const SEARCH_URL: &str = "https://mn.gov/law-library/search/";
const ORIGIN: &str = "https://mn.gov/";
const USER_AGENT: &str = "Jurisweep/0.1 Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
const REFERER: &str = "https://mn.gov/law-library/search/?v%3Asources=mn-law-library-opinions&query=+%28url%3A%2Farchive%2Fsupct%29+&citation=&qt=&sortby=&docket=&case=&v=&p=&start-date=&end-date=";

/// Longest candidate segment, in tokens, accepted as a disposition.
const MAX_DISPOSITION_TOKENS: usize = 10;

static NAME_WITH_DOCKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<name>.+)\. A\d{2}-\d+").unwrap());

static RESULT: Lazy<Selector> = Lazy::new(|| Selector::parse("div.searchresult").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.searchresult_snippet").unwrap());
static DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.searchresult_date").unwrap());

/// Docket surgery on the URL tail: first `delimiter`-separated piece of the
/// last path segment, minus `skip_chars` leading characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocketRule {
    pub delimiter: char,
    pub skip_chars: usize,
}

impl DocketRule {
    pub fn apply(&self, url: &str) -> String {
        let tail = url.rsplit('/').next().unwrap_or_default();
        let head = tail.split(self.delimiter).next().unwrap_or_default();
        head.chars().skip(self.skip_chars).collect()
    }
}

/// Text nodes that are direct children of `el`. Highlight markup such as
/// `<b>` is skipped along with its contents.
fn own_text<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
}

/// `OPA231234-080724.pdf` -> `A231234`.
pub const MINN_DOCKET: DocketRule = DocketRule {
    delimiter: '-',
    skip_chars: 2,
};

pub struct Minnesota {
    config: SiteConfig,
    docket_rule: DocketRule,
}

impl Minnesota {
    /// Adapter for one archive of the law library (`supct`, `ctappub`, `ctapun`).
    pub fn new(court_id: &'static str, court_name: &'static str, court_query: &str) -> Self {
        let status = if court_query == "ctapun" {
            Status::Unpublished
        } else {
            Status::Published
        };
        let config = SiteConfig {
            court_id,
            court_name,
            base_url: SEARCH_URL,
            base_query: vec![
                ("v:sources".into(), "mn-law-library-opinions".into()),
                ("query".into(), format!(" (url:/archive/{court_query}) ")),
                ("sortby".into(), "date".into()),
            ],
            headers: browser_headers(),
            interval_days: 7,
            first_opinion_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            verify_tls: false,
            query_date_format: "%-m/%-d/%Y",
            result_date_formats: &["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%Y-%m-%d"],
            status: StatusPolicy::Fixed(status),
        };
        Self {
            config,
            docket_rule: MINN_DOCKET,
        }
    }

    pub fn supreme() -> Self {
        Self::new("minn", "Minnesota Supreme Court", "supct")
    }

    pub fn court_of_appeals() -> Self {
        Self::new("minnctapp", "Minnesota Court of Appeals", "ctappub")
    }

    pub fn court_of_appeals_unpublished() -> Self {
        Self::new(
            "minnctapp_u",
            "Minnesota Court of Appeals (unpublished)",
            "ctapun",
        )
    }

    fn request(&self, query: Vec<(String, String)>) -> FetchRequest {
        FetchRequest {
            url: self.config.base_url.to_string(),
            query,
            headers: self.config.headers.clone(),
            verify_tls: self.config.verify_tls,
        }
    }

    fn extract(&self, node: ElementRef<'_>) -> Result<CaseRecord, RecordError> {
        let link = node
            .select(&LINK)
            .next()
            .ok_or(RecordError::MissingField("link"))?;
        let raw_name = own_text(link)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("name"))?;
        let href = link
            .value()
            .attr("href")
            .ok_or(RecordError::MissingField("url"))?;

        let summary = node
            .select(&SNIPPET)
            .next()
            .and_then(|s| own_text(s).next())
            .ok_or(RecordError::MissingField("summary"))?;

        let raw_date = node
            .select(&DATE)
            .last()
            .map(|d| d.text().collect::<String>())
            .ok_or(RecordError::MissingField("date"))?;
        let date_text = labelled_date(&raw_date).ok_or(RecordError::BadDate {
            raw: raw_date.clone(),
        })?;
        let date_filed = self
            .config
            .parse_result_date(&date_text)
            .ok_or(RecordError::BadDate { raw: date_text })?;

        let url = resolve_url(href)?;
        let status = self.config.default_status();
        let disposition = if status == Status::Published {
            disposition_from_summary(summary)
        } else {
            String::new()
        };

        Ok(CaseRecord {
            court_id: self.config.court_id.to_string(),
            date_filed,
            name: clean_name(raw_name).to_string(),
            docket: self.docket_rule.apply(href),
            url,
            disposition,
            summary: summary.to_string(),
            status,
            judge: None,
        })
    }
}

impl Adapter for Minnesota {
    fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Base query plus the chunk, both as form fields and as a `date:[..]`
    /// clause appended to the search query.
    fn build_request(&self, chunk: &DateChunk) -> FetchRequest {
        let range = format!(
            "date:[{}..{}]",
            chunk.start().format("%Y-%m-%d"),
            chunk.end().format("%Y-%m-%d")
        );
        let mut query = self.config.base_query.clone();
        for (key, value) in query.iter_mut() {
            if key == "query" {
                value.push_str(&range);
            }
        }
        query.push((
            "start-date".into(),
            self.config.format_query_date(chunk.start()),
        ));
        query.push(("end-date".into(), self.config.format_query_date(chunk.end())));
        self.request(query)
    }

    /// The search is already sorted newest first; no date filter is needed.
    fn latest_request(&self, _today: NaiveDate) -> Result<FetchRequest, ConfigError> {
        Ok(self.request(self.config.base_query.clone()))
    }

    fn parse(&self, document: &str) -> Result<Vec<CaseRecord>, ParseError> {
        let html = Html::parse_document(document);
        Ok(collect_records(
            self.config.court_id,
            html.select(&RESULT),
            |node| self.extract(node),
        ))
    }
}

fn browser_headers() -> Vec<(String, String)> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Fetch-Dest", "document"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Host", "mn.gov"),
        ("User-Agent", USER_AGENT),
        ("Referer", REFERER),
        ("Connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Text after the `Label:` prefix, with whitespace runs collapsed.
fn labelled_date(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .split(':')
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Protocol-relative and root-relative links resolve against `mn.gov`.
fn resolve_url(href: &str) -> Result<String, RecordError> {
    Url::parse(ORIGIN)
        .and_then(|base| base.join(href.trim()))
        .map(String::from)
        .map_err(|e| RecordError::BadUrl {
            raw: href.to_string(),
            reason: e.to_string(),
        })
}

/// Drop a trailing `. A12-3456 ...` docket suffix from a case title.
///
/// Titles without a recognizable docket are returned unchanged.
pub fn clean_name(raw: &str) -> &str {
    NAME_WITH_DOCKET
        .captures(raw)
        .and_then(|caps| caps.name("name"))
        .map_or(raw, |m| m.as_str())
}

/// The disposition is usually the last sentence of a published snippet.
///
/// Takes the second-to-last `.`-separated segment when there are at least
/// three, it has at most ten tokens, and it contains no digits. Otherwise
/// returns an empty string.
pub fn disposition_from_summary(summary: &str) -> String {
    let parts: Vec<&str> = summary.split('.').collect();
    if parts.len() <= 2 {
        return String::new();
    }
    let candidate = parts[parts.len() - 2];
    // Sometimes there is no disposition (A23-1504). False positives usually
    // carry a docket number (A22-0776).
    if candidate.split_whitespace().count() <= MAX_DISPOSITION_TOKENS
        && !candidate.chars().any(char::is_numeric)
    {
        candidate.trim().to_string()
    } else {
        String::new()
    }
}
