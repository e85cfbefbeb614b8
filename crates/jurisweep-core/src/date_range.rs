//! Date-range partitioning for backscrapes.
//!
//! A multi-year backfill is broken into fixed-length windows a court site
//! will accept in one request. Windows are inclusive on both ends and never
//! share a date, so a remote filter that is itself inclusive-inclusive does
//! not return a boundary day twice.
//!
//! ```text
//! partition(2017-01-01, 2017-02-03, 7)
//!   => [01-01..01-07] [01-08..01-14] [01-15..01-21] [01-22..01-28] [01-29..02-03]
//! ```

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::ConfigError;

/// One bounded date sub-range, `start <= end`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateChunk {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateChunk {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the chunk, boundaries included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Lazy, finite iterator over the chunks of `[start, end]`.
#[derive(Debug, Clone)]
pub struct DateChunks {
    next_start: Option<NaiveDate>,
    end: NaiveDate,
    interval: u64,
}

impl DateChunks {
    /// Validate inputs and build the iterator. Nothing is yielded on error.
    pub fn new(start: NaiveDate, end: NaiveDate, interval_days: i64) -> Result<Self, ConfigError> {
        if interval_days <= 0 {
            return Err(ConfigError::InvalidInterval(interval_days));
        }
        if start > end {
            return Err(ConfigError::StartAfterEnd { start, end });
        }
        Ok(Self {
            next_start: Some(start),
            end,
            interval: interval_days as u64,
        })
    }
}

impl Iterator for DateChunks {
    type Item = DateChunk;

    fn next(&mut self) -> Option<DateChunk> {
        let start = self.next_start.filter(|s| *s <= self.end)?;

        // Calendar arithmetic; saturate at the overall end.
        let end = start
            .checked_add_days(Days::new(self.interval - 1))
            .map_or(self.end, |e| e.min(self.end));
        self.next_start = start.checked_add_days(Days::new(self.interval));

        Some(DateChunk { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next_start {
            Some(s) if s <= self.end => {
                let n = ((self.end - s).num_days() as u64 / self.interval + 1) as usize;
                (n, Some(n))
            }
            _ => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for DateChunks {}

/// Split `[start, end]` into consecutive chunks of `interval_days`.
///
/// Chunk `i` starts at `start + i * interval_days`. The final chunk is
/// clamped to `end` and may be shorter than the interval. `start == end`
/// yields exactly one chunk.
pub fn partition(
    start: NaiveDate,
    end: NaiveDate,
    interval_days: i64,
) -> Result<Vec<DateChunk>, ConfigError> {
    Ok(DateChunks::new(start, end, interval_days)?.collect())
}
