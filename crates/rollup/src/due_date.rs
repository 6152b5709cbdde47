//! Earliest payment-due date across a group's lines.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// A resolved due date. Date-only inputs serialize back as `YYYY-MM-DD`,
/// timestamps as RFC 3339 UTC with milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate {
    pub instant: DateTime<Utc>,
    pub date_only: bool,
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

impl DueDate {
    /// Parse one candidate. Naive timestamps and bare dates are taken as UTC.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self {
                instant: dt.with_timezone(&Utc),
                date_only: false,
            });
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self {
                    instant: Utc.from_utc_datetime(&naive),
                    date_only: false,
                });
            }
        }

        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Self {
            instant: Utc.from_utc_datetime(&midnight),
            date_only: true,
        })
    }

    /// Equal instants order the date-only form first, keeping resolution
    /// independent of input order.
    fn sort_key(&self) -> (DateTime<Utc>, bool) {
        (self.instant, !self.date_only)
    }
}

impl std::fmt::Display for DueDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.date_only {
            write!(f, "{}", self.instant.format("%Y-%m-%d"))
        } else {
            write!(f, "{}", self.instant.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Earliest valid date among `candidates`, or `None` if nothing parses.
pub fn earliest_due_date<I, S>(candidates: I) -> Option<DueDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|c| DueDate::parse(c.as_ref()))
        .min_by_key(DueDate::sort_key)
}
