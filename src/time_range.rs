use crate::error::QueryError;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, Utc};

/// Absolute query window; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Resolve `--start`, `--end` and `--since` against `now`.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        since: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, QueryError> {
        let end = end.map(parse_time).transpose()?;

        let start = match (start, since) {
            (Some(_), Some(_)) => {
                return Err(QueryError::Config(
                    "Cannot use both --start and --since".to_string(),
                ))
            }
            (Some(text), None) => Some(parse_time(text)?),
            (None, Some(text)) => Some(end.unwrap_or(now) - parse_since(text)?),
            (None, None) => None,
        };

        // --since without --end means "up to now"
        let end = match (end, since) {
            (None, Some(_)) => Some(now),
            (end, _) => end,
        };

        if let (Some(s), Some(e)) = (start, end) {
            if s >= e {
                return Err(QueryError::Config(format!(
                    "Start time {} is not before end time {}",
                    s.to_rfc3339(),
                    e.to_rfc3339()
                )));
            }
        }

        Ok(TimeRange { start, end })
    }
}

/// Parse an absolute timestamp, trying strict formats before dateparser
pub fn parse_time(text: &str) -> Result<DateTime<Utc>, QueryError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Without a timezone, assume UTC
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    dateparser::parse(text)
        .map_err(|e| QueryError::Config(format!("Cannot parse time '{}': {}", text, e)))
}

/// Parse a relative duration such as `15m` or `2h 30m`
pub fn parse_since(text: &str) -> Result<ChronoDuration, QueryError> {
    let duration = humantime::parse_duration(text.trim())
        .map_err(|e| QueryError::Config(format!("Cannot parse duration '{}': {}", text, e)))?;
    ChronoDuration::from_std(duration)
        .map_err(|_| QueryError::Config(format!("Duration '{}' is out of range", text)))
}
