//! Trio Schedule: resolves the therapy setting active at a time of day.
//!
//! ```
//! use chrono::NaiveTime;
//! use rust_decimal_macros::dec;
//! use trio_schedule::{active_value, ScheduleEntry};
//!
//! let isf = vec![
//!     ScheduleEntry::new("00:00", dec!(60)),
//!     ScheduleEntry::new("08:00", dec!(45)),
//! ];
//! let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
//! assert_eq!(active_value(&isf, noon), dec!(45));
//! ```

pub mod profile;
pub mod schedule;
pub mod time;

pub use profile::{
    BasalProfileEntry, BgTargetEntry, BgTargets, CarbRatioEntry, CarbRatios, CarbUnits,
    InsulinSensitivities, InsulinSensitivityEntry, ProfileValues, SettingType, TherapyProfile,
};
pub use schedule::{active_value, Schedule, ScheduleEntry};
pub use time::parse_time_of_day;
