//! Time-windowed schedules
//!
//! A schedule is a list of `(start, value)` pairs. Entry `i` is active on
//! `[start_i, start_{i+1})`; the last entry runs past midnight until the
//! first entry starts again the next day.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::time::parse_time_of_day;

/// One raw schedule row as stored in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: String,
    pub value: Decimal,
}

impl ScheduleEntry {
    pub fn new(start: impl Into<String>, value: Decimal) -> Self {
        Self {
            start: start.into(),
            value,
        }
    }
}

/// A schedule with parsed start times, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    entries: Vec<(NaiveTime, Decimal)>,
}

impl Schedule {
    /// Build from raw rows. Rows whose start time does not parse are skipped.
    pub fn from_entries<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let mut entries: Vec<(NaiveTime, Decimal)> = rows
            .into_iter()
            .filter_map(|(start, value)| match parse_time_of_day(start) {
                Some(time) => Some((time, value)),
                None => {
                    warn!(start, "invalid schedule entry start time, skipping");
                    None
                }
            })
            .collect();
        entries.sort_by_key(|(time, _)| *time);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value whose interval contains `time`, or `None` for an empty schedule.
    pub fn value_at(&self, time: NaiveTime) -> Option<Decimal> {
        self.entries
            .iter()
            .rev()
            .find(|(start, _)| *start <= time)
            .or_else(|| self.entries.last())
            .map(|(_, value)| *value)
    }
}

impl<'a> FromIterator<&'a ScheduleEntry> for Schedule {
    fn from_iter<T: IntoIterator<Item = &'a ScheduleEntry>>(iter: T) -> Self {
        Schedule::from_entries(iter.into_iter().map(|e| (e.start.as_str(), e.value)))
    }
}

/// Value active at `time`; zero when nothing matches.
///
/// Zero is a sentinel: callers dividing by the result must guard it.
pub fn active_value(entries: &[ScheduleEntry], time: NaiveTime) -> Decimal {
    entries
        .iter()
        .collect::<Schedule>()
        .value_at(time)
        .unwrap_or(Decimal::ZERO)
}
