use chrono::{Days, NaiveDate};
use jurisweep_core::{ConfigError, DateChunk, Status};

/// How a site assigns [`Status`] to its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Every record from the site gets the same status.
    Fixed(Status),
    /// The adapter classifies each record from its own fields, falling back
    /// to [`Status::Unknown`].
    PerRecord,
}

/// Immutable per-site settings, fixed when the adapter is constructed.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub court_id: &'static str,
    pub court_name: &'static str,
    /// Search endpoint, without query string.
    pub base_url: &'static str,
    /// Site identity and sort order, sent with every request.
    pub base_query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Backscrape chunk length in days.
    pub interval_days: i64,
    /// Earliest date the site has opinions for; default backscrape start.
    pub first_opinion_date: NaiveDate,
    pub verify_tls: bool,
    /// `strftime` pattern for dates sent in the query.
    pub query_date_format: &'static str,
    /// `strftime` patterns accepted when reading dates from results.
    pub result_date_formats: &'static [&'static str],
    pub status: StatusPolicy,
}

impl SiteConfig {
    /// The status a record gets when it carries no classification of its own.
    pub fn default_status(&self) -> Status {
        match self.status {
            StatusPolicy::Fixed(status) => status,
            StatusPolicy::PerRecord => Status::Unknown,
        }
    }

    pub fn format_query_date(&self, date: NaiveDate) -> String {
        date.format(self.query_date_format).to_string()
    }

    /// Parse a result date with the first matching accepted format.
    pub fn parse_result_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.result_date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// The trailing window of one interval ending at `today`, never starting
    /// before the site's first opinion date.
    pub fn trailing_window(&self, today: NaiveDate) -> Result<DateChunk, ConfigError> {
        let back = self.interval_days.max(1) as u64 - 1;
        let start = today
            .checked_sub_days(Days::new(back))
            .unwrap_or(self.first_opinion_date)
            .max(self.first_opinion_date);
        DateChunk::new(start, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(status: StatusPolicy) -> SiteConfig {
        SiteConfig {
            court_id: "test",
            court_name: "Test Court",
            base_url: "https://example.test/search",
            base_query: vec![],
            headers: vec![],
            interval_days: 7,
            first_opinion_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            verify_tls: true,
            query_date_format: "%-m/%-d/%Y",
            result_date_formats: &["%B %d, %Y", "%m/%d/%Y"],
            status,
        }
    }

    #[test]
    fn default_status_follows_policy() {
        assert_eq!(
            config(StatusPolicy::Fixed(Status::Unpublished)).default_status(),
            Status::Unpublished
        );
        assert_eq!(config(StatusPolicy::PerRecord).default_status(), Status::Unknown);
    }

    #[test]
    fn query_date_is_unpadded() {
        let cfg = config(StatusPolicy::PerRecord);
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(cfg.format_query_date(date), "3/5/2024");
    }

    #[test]
    fn result_date_tries_each_format() {
        let cfg = config(StatusPolicy::PerRecord);
        let expected = NaiveDate::from_ymd_opt(2024, 8, 7);
        assert_eq!(cfg.parse_result_date("August 7, 2024"), expected);
        assert_eq!(cfg.parse_result_date(" 08/07/2024 "), expected);
        assert_eq!(cfg.parse_result_date("yesterday"), None);
    }

    #[test]
    fn trailing_window_spans_one_interval() {
        let cfg = config(StatusPolicy::PerRecord);
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let window = cfg.trailing_window(today).unwrap();
        assert_eq!(window.start(), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        assert_eq!(window.end(), today);
        assert_eq!(window.days(), 7);
    }

    #[test]
    fn trailing_window_clamped_to_first_opinion() {
        let cfg = config(StatusPolicy::PerRecord);
        let today = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
        let window = cfg.trailing_window(today).unwrap();
        assert_eq!(window.start(), cfg.first_opinion_date);
    }
}
