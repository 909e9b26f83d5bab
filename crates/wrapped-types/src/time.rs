use chrono::{DateTime, TimeZone, Utc};

/// Parse an ISO-8601 timestamp string to `DateTime<Utc>`.
///
/// A trailing `Z` is accepted as `+00:00`. All failures (missing input,
/// empty string, garbage) degrade to `None` so callers can treat the
/// timestamp as "unavailable" rather than handling an error.
pub fn parse_iso_timestamp(ts: Option<&str>) -> Option<DateTime<Utc>> {
    let ts = ts?.trim();
    if ts.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Inclusive time window used to filter sessions to one analysis year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering a full calendar year in UTC.
    pub fn year(year: i32) -> Self {
        let start = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .expect("jan 1 is always a valid date");
        let end = Utc
            .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
            .single()
            .expect("dec 31 is always a valid date");
        Self { start, end }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}
