//! Glucose/Determination Aggregator
//!
//! Reduces glucose history and the latest algorithm determination to the
//! scalars the dose calculator reads. Missing data becomes zero, never an
//! error: the calculator's guards decide what zero means.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trio_core::{Determination, GlucoseSample};
use trio_schedule::ProfileValues;

/// Minutes a determination stays usable for a manual bolus.
pub const DETERMINATION_WINDOW_MINUTES: i64 = 30;

/// How the 15-minute glucose change is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaStrategy {
    /// Newest reading minus the reading two positions older.
    ///
    /// Assumes a 5-minute CGM cadence. Gaps in the history stretch the
    /// interval silently.
    #[default]
    SampleIndex,
    /// Newest minus oldest reading inside the window ending now.
    RecentWindow(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlucoseVariables {
    pub current_bg: Decimal,
    pub delta_bg: Decimal,
}

/// Current glucose and recent change. `samples` may come in any order.
pub fn glucose_variables(
    samples: &[GlucoseSample],
    strategy: DeltaStrategy,
    now: DateTime<Utc>,
) -> GlucoseVariables {
    let mut samples = samples.to_vec();
    samples.sort_by(|a, b| b.date.cmp(&a.date));

    let Some(newest) = samples.first() else {
        debug!("no glucose readings");
        return GlucoseVariables::default();
    };
    let current_bg = Decimal::from(newest.glucose);

    let delta_bg = match strategy {
        DeltaStrategy::SampleIndex => samples
            .get(2)
            .map(|older| Decimal::from(newest.glucose) - Decimal::from(older.glucose))
            .unwrap_or(Decimal::ZERO),
        DeltaStrategy::RecentWindow(window) => {
            let cutoff = now - window;
            let recent: Vec<&GlucoseSample> = samples.iter().filter(|s| s.date > cutoff).collect();
            match (recent.first(), recent.last()) {
                (Some(first), Some(last)) if recent.len() >= 2 => {
                    Decimal::from(first.glucose) - Decimal::from(last.glucose)
                }
                _ => Decimal::ZERO,
            }
        }
    };

    debug!(%current_bg, %delta_bg, readings = samples.len(), "glucose variables");
    GlucoseVariables { current_bg, delta_bg }
}

/// Determination-derived values, with schedule fallbacks already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BolusVariables {
    pub iob: Decimal,
    pub cob: Decimal,
    pub target: Decimal,
    pub isf: Decimal,
    pub carb_ratio: Decimal,
    pub basal: Decimal,
    pub min_pred_bg: Decimal,
    pub eventual_bg: Decimal,
    pub insulin_required: Decimal,
    pub insulin_for_manual_bolus: Decimal,
}

/// Merge the latest determination with the active schedule values.
///
/// A determination older than `window` is ignored. IOB, COB and forecast
/// values are then zero; target, ISF and carb ratio come from `schedule`.
/// Basal always comes from the schedule.
pub fn bolus_variables(
    determination: Option<&Determination>,
    schedule: ProfileValues,
    now: DateTime<Utc>,
    window: Duration,
) -> BolusVariables {
    let fresh = determination.filter(|d| d.timestamp >= now - window);
    if determination.is_some() && fresh.is_none() {
        debug!(window_minutes = window.num_minutes(), "determination too old, using schedules");
    }

    let Some(d) = fresh else {
        return BolusVariables {
            target: schedule.bg_target,
            isf: schedule.isf,
            carb_ratio: schedule.carb_ratio,
            basal: schedule.basal,
            ..BolusVariables::default()
        };
    };

    BolusVariables {
        iob: d.iob.unwrap_or(Decimal::ZERO),
        cob: Decimal::from(d.cob),
        target: d.current_target.unwrap_or(schedule.bg_target),
        isf: d.insulin_sensitivity.unwrap_or(schedule.isf),
        carb_ratio: d.carb_ratio.unwrap_or(schedule.carb_ratio),
        basal: schedule.basal,
        min_pred_bg: d.min_pred_bg.unwrap_or(Decimal::ZERO),
        eventual_bg: d.eventual_bg.unwrap_or(Decimal::ZERO),
        insulin_required: d.insulin_req.unwrap_or(Decimal::ZERO),
        insulin_for_manual_bolus: d.insulin_for_manual_bolus.unwrap_or(Decimal::ZERO),
    }
}
