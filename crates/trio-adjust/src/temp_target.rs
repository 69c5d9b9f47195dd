//! Temp targets and the preferences the algorithm sees while one runs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trio_core::Preferences;

use crate::sensitivity::compute_adjusted_percentage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempTarget {
    #[serde(default)]
    pub name: Option<String>,
    /// Target glucose, mg/dL
    pub target: Decimal,
    /// Half-basal target chosen with the sensitivity slider; `None` keeps the preference
    #[serde(default)]
    pub half_basal_target: Option<Decimal>,
    #[serde(default = "TempTarget::default_enabled")]
    pub enabled: bool,
}

impl TempTarget {
    pub fn new(target: Decimal) -> Self {
        Self {
            name: None,
            target,
            half_basal_target: None,
            enabled: true,
        }
    }

    pub fn with_half_basal_target(mut self, hbt: Decimal) -> Self {
        self.half_basal_target = Some(hbt);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn default_enabled() -> bool {
        true
    }

    /// Sensitivity percentage this target produces under `preferences`.
    pub fn sensitivity_percentage(&self, preferences: &Preferences) -> Decimal {
        let effective = effective_preferences(preferences, Some(self));
        compute_adjusted_percentage(
            effective.half_basal_exercise_target,
            self.target,
            effective.autosens_max,
        )
    }
}

/// Preferences as handed to the algorithm.
///
/// An enabled temp target's own half-basal target replaces the configured one.
/// `low_temptarget_lowers_sensitivity` is switched off when `autosens_max`
/// leaves no room to raise insulin delivery.
pub fn effective_preferences(preferences: &Preferences, active: Option<&TempTarget>) -> Preferences {
    let mut adjusted = preferences.clone();

    if let Some(hbt) = active
        .filter(|tt| tt.enabled)
        .and_then(|tt| tt.half_basal_target)
        .filter(|hbt| *hbt != preferences.half_basal_exercise_target)
    {
        debug!(%hbt, "half basal target from active temp target");
        adjusted.half_basal_exercise_target = hbt;
    }

    if preferences.low_temptarget_lowers_sensitivity && preferences.autosens_max <= Decimal::ONE {
        debug!(autosens_max = %preferences.autosens_max, "low temp target cannot lower sensitivity");
        adjusted.low_temptarget_lowers_sensitivity = false;
    }

    adjusted
}
