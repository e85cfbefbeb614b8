use chrono::NaiveDate;
use thiserror::Error;

/// Invalid backscrape parameters. Raised before any chunk is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("interval must be at least one day, got {0}")]
    InvalidInterval(i64),

    #[error("start date {start} is after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("unknown court id: {0}")]
    UnknownCourt(String),
}

/// A single result node could not be turned into a record.
///
/// Always recovered at node granularity: the node is skipped and the rest of
/// the document is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unparseable date {raw:?}")]
    BadDate { raw: String },

    #[error("unresolvable url {raw:?}: {reason}")]
    BadUrl { raw: String, reason: String },
}
