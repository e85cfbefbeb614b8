pub mod date_range;
pub mod error;
pub mod record;

pub use date_range::{DateChunk, DateChunks, partition};
pub use error::{ConfigError, RecordError};
pub use record::{CaseRecord, Status, dedup_records};
