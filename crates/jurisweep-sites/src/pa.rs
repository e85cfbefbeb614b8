//! Pennsylvania appellate opinions via the pacourts.us opinion API.
//!
//! The API returns clusters (one per disposition) each holding one or more
//! postings (majority, concurrence, dissent...). Every posting is a record;
//! its publication type decides the status.

use chrono::NaiveDate;
use jurisweep_core::{CaseRecord, DateChunk, RecordError, Status};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::{Adapter, FetchRequest, ParseError, SiteConfig, StatusPolicy, collect_records};

const API_URL: &str = "https://www.pacourts.us/api/opinion";
const DOCUMENT_BASE: &str = "https://www.pacourts.us/assets/opinions/";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OpinionPage {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Cluster {
    caption: Option<String>,
    disposition_date: Option<String>,
    docket_number: Option<String>,
    #[serde(default)]
    postings: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Posting {
    file_name: Option<String>,
    author: Option<Author>,
    publication_type: Option<PublicationType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Author {
    formatted_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublicationType {
    description: Option<String>,
}

/// Fields shared by every posting of a cluster.
struct ClusterHeader {
    name: String,
    date_filed: NaiveDate,
    docket: String,
}

pub struct Pennsylvania {
    config: SiteConfig,
    /// `courtType` value, also the document path segment.
    court: &'static str,
}

impl Pennsylvania {
    pub fn new(
        court_id: &'static str,
        court_name: &'static str,
        court: &'static str,
        post_types: &str,
        interval_days: i64,
        first_opinion_date: NaiveDate,
    ) -> Self {
        let config = SiteConfig {
            court_id,
            court_name,
            base_url: API_URL,
            base_query: vec![
                ("courtType".into(), court.into()),
                ("postTypes".into(), post_types.into()),
                ("sortDirection".into(), "-1".into()),
            ],
            headers: vec![],
            interval_days,
            first_opinion_date,
            verify_tls: true,
            query_date_format: "%Y-%m-%d",
            result_date_formats: &["%Y-%m-%d"],
            status: StatusPolicy::PerRecord,
        };
        Self { config, court }
    }

    pub fn superior() -> Self {
        Self::new(
            "pasuperct",
            "Superior Court of Pennsylvania",
            "Superior",
            "1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,32,33",
            20,
            NaiveDate::from_ymd_opt(1998, 2, 15).unwrap_or(NaiveDate::MIN),
        )
    }

    fn header(&self, cluster: &Cluster) -> Result<ClusterHeader, RecordError> {
        let name = cluster
            .caption
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("Caption"))?;
        let raw_date = cluster
            .disposition_date
            .as_deref()
            .ok_or(RecordError::MissingField("DispositionDate"))?;
        let date_part = raw_date.split('T').next().unwrap_or_default();
        let date_filed =
            self.config
                .parse_result_date(date_part)
                .ok_or_else(|| RecordError::BadDate {
                    raw: raw_date.to_string(),
                })?;
        Ok(ClusterHeader {
            name: name.to_string(),
            date_filed,
            docket: cluster.docket_number.clone().unwrap_or_default(),
        })
    }

    fn extract(&self, header: &ClusterHeader, posting: Value) -> Result<CaseRecord, RecordError> {
        let posting: Posting = serde_json::from_value(posting)
            .map_err(|_| RecordError::MissingField("Posting"))?;
        let file_name = posting
            .file_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("FileName"))?;

        let judge = posting
            .author
            .as_ref()
            .and_then(|a| a.formatted_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(CaseRecord {
            court_id: self.config.court_id.to_string(),
            date_filed: header.date_filed,
            name: header.name.clone(),
            url: self.document_url(file_name)?,
            docket: header.docket.clone(),
            disposition: String::new(),
            summary: String::new(),
            status: classify(&posting),
            judge,
        })
    }

    /// `{base}/{court}/out/{file_name}`, the file name kept as one path
    /// segment whatever characters it carries.
    fn document_url(&self, file_name: &str) -> Result<String, RecordError> {
        let bad_url = |reason: String| RecordError::BadUrl {
            raw: file_name.to_string(),
            reason,
        };
        let mut url = Url::parse(DOCUMENT_BASE).map_err(|e| bad_url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| bad_url("base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend([self.court, "out", file_name]);
        Ok(url.into())
    }
}

/// Status from the posting's publication type.
fn classify(posting: &Posting) -> Status {
    let descr = posting
        .publication_type
        .as_ref()
        .and_then(|p| p.description.as_deref())
        .unwrap_or_default();
    status_from_description(descr)
}

pub fn status_from_description(descr: &str) -> Status {
    match descr {
        "Non-Precedential" => Status::Unpublished,
        "Precedential" => Status::Published,
        _ => Status::Unknown,
    }
}

impl Adapter for Pennsylvania {
    fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn build_request(&self, chunk: &DateChunk) -> FetchRequest {
        let mut query = vec![
            (
                "startDate".to_string(),
                self.config.format_query_date(chunk.start()),
            ),
            (
                "endDate".to_string(),
                self.config.format_query_date(chunk.end()),
            ),
        ];
        query.extend(self.config.base_query.iter().cloned());
        FetchRequest {
            url: self.config.base_url.to_string(),
            query,
            headers: self.config.headers.clone(),
            verify_tls: self.config.verify_tls,
        }
    }

    fn parse(&self, document: &str) -> Result<Vec<CaseRecord>, ParseError> {
        let page: OpinionPage = serde_json::from_str(document)?;
        let court_id = self.config.court_id;

        let mut records = Vec::new();
        for (index, item) in page.items.into_iter().enumerate() {
            let header = serde_json::from_value::<Cluster>(item)
                .map_err(|_| RecordError::MissingField("Items"))
                .and_then(|cluster| Ok((self.header(&cluster)?, cluster.postings)));
            match header {
                Ok((header, postings)) => {
                    records.extend(collect_records(court_id, postings, |p| {
                        self.extract(&header, p)
                    }));
                }
                Err(e) => warn!(court = court_id, index, error = %e, "skipping malformed cluster"),
            }
        }
        Ok(records)
    }
}
