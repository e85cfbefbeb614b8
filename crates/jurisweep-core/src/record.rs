//! Normalized opinion records shared by every court adapter.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Publication status of an opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Published,
    Unpublished,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "Published"),
            Self::Unpublished => write!(f, "Unpublished"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One opinion as handed to the downstream ingestion pipeline.
///
/// `disposition` is the empty string unless a site heuristic positively
/// detected one. `summary` is kept exactly as the source provided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub court_id: String,
    pub date_filed: NaiveDate,
    pub name: String,
    /// Absolute URL of the opinion document.
    pub url: String,
    pub docket: String,
    pub disposition: String,
    pub summary: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
}

/// Drop records whose URL was already seen, keeping the first occurrence.
///
/// Input order is preserved for the surviving records.
pub fn dedup_records(records: Vec<CaseRecord>) -> Vec<CaseRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let before = records.len();
    let out: Vec<CaseRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect();
    if out.len() < before {
        tracing::debug!(dropped = before - out.len(), "removed duplicate records");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, name: &str) -> CaseRecord {
        CaseRecord {
            court_id: "minn".into(),
            date_filed: NaiveDate::from_ymd_opt(2024, 8, 7).unwrap(),
            name: name.into(),
            url: url.into(),
            docket: "A231234".into(),
            disposition: String::new(),
            summary: "Affirmed.".into(),
            status: Status::Published,
            judge: None,
        }
    }

    #[test]
    fn status_display_matches_serde_name() {
        for status in [Status::Published, Status::Unpublished, Status::Unknown] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn record_json_shape() {
        let json = serde_json::to_value(record("https://mn.gov/a.pdf", "State v. Doe")).unwrap();
        assert_eq!(json["date_filed"], "2024-08-07");
        assert_eq!(json["status"], "Published");
        assert_eq!(json["disposition"], "");
        assert!(json.get("judge").is_none());
    }

    #[test]
    fn record_json_roundtrip_with_judge() {
        let mut rec = record("https://mn.gov/a.pdf", "State v. Doe");
        rec.judge = Some("Bowes".into());
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: CaseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = serde_json::from_str::<Status>("\"Precedential\"");
        assert!(err.is_err());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let records = vec![
            record("https://mn.gov/a.pdf", "first"),
            record("https://mn.gov/b.pdf", "other"),
            record("https://mn.gov/a.pdf", "second"),
        ];
        let out = dedup_records(records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "first");
        assert_eq!(out[1].name, "other");
    }

    #[test]
    fn dedup_empty() {
        assert!(dedup_records(Vec::new()).is_empty());
    }
}
