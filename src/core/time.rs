//! Shared timestamp helpers and calendar arithmetic.
//!
//! Day keys, CLI date parsing, and the today/week/month intervals used by the
//! financial summaries.

use crate::core::error::CluckError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Day key layout used by the ledger (`dd.MM.yyyy`).
pub const DAY_KEY_FORMAT: &str = "%d.%m.%Y";
pub const TIME_FORMAT: &str = "%H:%M";

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()
}

/// Accepts `dd.MM.yyyy` or ISO `yyyy-mm-dd`.
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate, CluckError> {
    let raw = raw.trim();
    parse_day_key(raw)
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            CluckError::ValidationError(format!(
                "invalid date '{}': expected dd.MM.yyyy or yyyy-mm-dd",
                raw
            ))
        })
}

pub fn parse_time_arg(raw: &str) -> Result<NaiveTime, CluckError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|_| {
        CluckError::ValidationError(format!("invalid time '{}': expected HH:MM", raw))
    })
}

/// Reporting window for financial sums, always relative to a caller-supplied "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    All,
}

impl Period {
    /// Half-open `[start, end)` interval in `now`'s local wall time. `None` for `All`.
    pub fn bounds(&self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let day = now.date();
        let (start, end) = match self {
            Period::Today => (day, day + Duration::days(1)),
            Period::Week => {
                let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(7))
            }
            Period::Month => {
                let first = day.with_day(1)?;
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
                };
                (first, next)
            }
            Period::All => return None,
        };
        Some((
            start.and_time(NaiveTime::MIN),
            end.and_time(NaiveTime::MIN),
        ))
    }

    /// Whether `at` falls inside this period, judged on `now`'s calendar.
    pub fn contains<Tz: TimeZone, Tz2: TimeZone>(&self, at: &DateTime<Tz2>, now: &DateTime<Tz>) -> bool {
        let Some((start, end)) = self.bounds(now.naive_local()) else {
            return true;
        };
        let local = at.with_timezone(&now.timezone()).naive_local();
        local >= start && local < end
    }
}
