//! Time-of-day parsing for schedule entries.
use chrono::NaiveTime;

/// Parse a schedule start time written as `HH:mm` or `HH:mm:ss`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
