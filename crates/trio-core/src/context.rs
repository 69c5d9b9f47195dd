//! Calculation Context: per-request state passed down the gather/compute pipeline
use chrono::{DateTime, FixedOffset, Local, NaiveTime, Offset, Utc};

#[derive(Debug, Clone)]
pub struct CalculationContext {
    pub trace_id: String,
    /// Wall clock used for staleness, recency windows and schedule lookup.
    pub now: DateTime<Utc>,
    /// Offset of the user's wall clock; schedules are keyed by local time of day.
    pub utc_offset: FixedOffset,
    /// Where the request came from ("bolus-view", "remote-command", ...).
    pub origin: String,
}

impl CalculationContext {
    pub fn new(origin: impl Into<String>) -> Self {
        let now = Utc::now();
        let utc_offset = now.with_timezone(&Local).offset().fix();
        Self::at(origin, now, utc_offset)
    }

    /// Context pinned to a fixed instant, used by tests and replays.
    pub fn at(origin: impl Into<String>, now: DateTime<Utc>, utc_offset: FixedOffset) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            now,
            utc_offset,
            origin: origin.into(),
        }
    }

    /// Local time of day of `now`.
    pub fn local_time(&self) -> NaiveTime {
        self.now.with_timezone(&self.utc_offset).time()
    }
}
