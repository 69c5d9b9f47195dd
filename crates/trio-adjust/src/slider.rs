//! Bounds for the sensitivity percentage a user may pick for a temp target
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trio_core::Preferences;

use crate::sensitivity::NORMAL_TARGET;

/// oref's strongest allowed sensitivity increase, percent.
pub const MIN_SENSITIVITY_PERCENT: Decimal = dec!(15);

/// Preference flags that decide whether a temp target may change sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBehavior {
    pub high_temptarget_raises_sensitivity: bool,
    pub low_temptarget_lowers_sensitivity: bool,
    pub exercise_mode: bool,
    pub autosens_max: Decimal,
}

impl From<&Preferences> for TargetBehavior {
    fn from(preferences: &Preferences) -> Self {
        Self {
            high_temptarget_raises_sensitivity: preferences.high_temptarget_raises_sensitivity,
            low_temptarget_lowers_sensitivity: preferences.low_temptarget_lowers_sensitivity,
            exercise_mode: preferences.exercise_mode,
            autosens_max: preferences.autosens_max,
        }
    }
}

/// Inclusive percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageRange {
    pub low: Decimal,
    pub high: Decimal,
}

impl PercentageRange {
    /// The only choice when sensitivity may not change.
    pub const FIXED: PercentageRange = PercentageRange {
        low: dec!(100),
        high: dec!(100),
    };

    pub fn contains(&self, percentage: Decimal) -> bool {
        percentage >= self.low && percentage <= self.high
    }

    pub fn clamp(&self, percentage: Decimal) -> Decimal {
        percentage.max(self.low).min(self.high)
    }
}

/// Lower slider bound. A low target can only raise insulin need, so its range starts above 100.
pub fn compute_slider_low(target: Decimal) -> Decimal {
    if target.is_zero() {
        return MIN_SENSITIVITY_PERCENT;
    }
    if target < NORMAL_TARGET {
        dec!(105)
    } else {
        MIN_SENSITIVITY_PERCENT
    }
}

/// Upper slider bound. A high target can only lower insulin need, so its range ends below 100.
pub fn compute_slider_high(target: Decimal, autosens_max: Decimal) -> Decimal {
    let cap = autosens_max * dec!(100);
    if target.is_zero() {
        return cap;
    }
    if target > NORMAL_TARGET {
        dec!(95)
    } else {
        cap
    }
}

pub fn is_adjust_sens_enabled(target: Decimal, behavior: &TargetBehavior) -> bool {
    if target < NORMAL_TARGET
        && behavior.low_temptarget_lowers_sensitivity
        && behavior.autosens_max > Decimal::ONE
    {
        return true;
    }
    target > NORMAL_TARGET && (behavior.high_temptarget_raises_sensitivity || behavior.exercise_mode)
}

/// Selectable range for `target`, or [`PercentageRange::FIXED`] when the
/// preferences do not let this target adjust sensitivity.
pub fn slider_range(target: Decimal, behavior: &TargetBehavior) -> PercentageRange {
    if !is_adjust_sens_enabled(target, behavior) {
        return PercentageRange::FIXED;
    }
    PercentageRange {
        low: compute_slider_low(target),
        high: compute_slider_high(target, behavior.autosens_max),
    }
}
