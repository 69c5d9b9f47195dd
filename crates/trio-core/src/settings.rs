//! Settings documents read by the calculator
//!
//! Field names follow the JSON files the loop writes to disk, so a stored
//! `preferences.json` or `settings.json` decodes directly. Every missing field
//! takes the app default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod defaults {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub const MAX_IOB: Decimal = dec!(0);
    pub const MAX_COB: Decimal = dec!(120);
    pub const AUTOSENS_MAX: Decimal = dec!(1.2);
    pub const HALF_BASAL_EXERCISE_TARGET: Decimal = dec!(160);
    pub const INSULIN_ACTION_CURVE: Decimal = dec!(10);
    pub const MAX_BOLUS: Decimal = dec!(10);
    pub const MAX_BASAL: Decimal = dec!(2);
    pub const OVERRIDE_FACTOR: Decimal = dec!(0.8);
    pub const FATTY_MEAL_FACTOR: Decimal = dec!(0.7);
    pub const SWEET_MEAL_FACTOR: Decimal = dec!(1);
    pub const MAX_CARBS: Decimal = dec!(250);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GlucoseUnits {
    #[default]
    #[serde(rename = "mg/dL")]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
}

/// Algorithm preferences (`preferences.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "max_iob", default = "Preferences::default_max_iob")]
    pub max_iob: Decimal,

    #[serde(rename = "maxCOB", default = "Preferences::default_max_cob")]
    pub max_cob: Decimal,

    #[serde(rename = "autosens_max", default = "Preferences::default_autosens_max")]
    pub autosens_max: Decimal,

    #[serde(rename = "high_temptarget_raises_sensitivity", default)]
    pub high_temptarget_raises_sensitivity: bool,

    #[serde(rename = "low_temptarget_lowers_sensitivity", default)]
    pub low_temptarget_lowers_sensitivity: bool,

    #[serde(rename = "exercise_mode", default)]
    pub exercise_mode: bool,

    #[serde(
        rename = "half_basal_exercise_target",
        default = "Preferences::default_half_basal_target"
    )]
    pub half_basal_exercise_target: Decimal,
}

impl Preferences {
    fn default_max_iob() -> Decimal {
        defaults::MAX_IOB
    }

    fn default_max_cob() -> Decimal {
        defaults::MAX_COB
    }

    fn default_autosens_max() -> Decimal {
        defaults::AUTOSENS_MAX
    }

    fn default_half_basal_target() -> Decimal {
        defaults::HALF_BASAL_EXERCISE_TARGET
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_iob: defaults::MAX_IOB,
            max_cob: defaults::MAX_COB,
            autosens_max: defaults::AUTOSENS_MAX,
            high_temptarget_raises_sensitivity: false,
            low_temptarget_lowers_sensitivity: false,
            exercise_mode: false,
            half_basal_exercise_target: defaults::HALF_BASAL_EXERCISE_TARGET,
        }
    }
}

/// Pump limits (`settings.json` in the oref settings directory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpSettings {
    #[serde(rename = "insulin_action_curve", default = "PumpSettings::default_dia")]
    pub insulin_action_curve: Decimal,

    #[serde(rename = "maxBolus", default = "PumpSettings::default_max_bolus")]
    pub max_bolus: Decimal,

    #[serde(rename = "maxBasal", default = "PumpSettings::default_max_basal")]
    pub max_basal: Decimal,
}

impl PumpSettings {
    fn default_dia() -> Decimal {
        defaults::INSULIN_ACTION_CURVE
    }

    fn default_max_bolus() -> Decimal {
        defaults::MAX_BOLUS
    }

    fn default_max_basal() -> Decimal {
        defaults::MAX_BASAL
    }
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self {
            insulin_action_curve: defaults::INSULIN_ACTION_CURVE,
            max_bolus: defaults::MAX_BOLUS,
            max_basal: defaults::MAX_BASAL,
        }
    }
}

/// Bolus calculator options from the app settings (`trio_settings.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BolusSettings {
    #[serde(default)]
    pub units: GlucoseUnits,

    /// Recommended bolus percentage, applied as the general correction fraction
    #[serde(default = "BolusSettings::default_override_factor")]
    pub override_factor: Decimal,

    #[serde(default = "BolusSettings::default_fatty_meal_factor")]
    pub fatty_meal_factor: Decimal,

    #[serde(default = "BolusSettings::default_sweet_meal_factor")]
    pub sweet_meal_factor: Decimal,

    #[serde(default = "BolusSettings::default_max_carbs")]
    pub max_carbs: Decimal,
}

impl BolusSettings {
    fn default_override_factor() -> Decimal {
        defaults::OVERRIDE_FACTOR
    }

    fn default_fatty_meal_factor() -> Decimal {
        defaults::FATTY_MEAL_FACTOR
    }

    fn default_sweet_meal_factor() -> Decimal {
        defaults::SWEET_MEAL_FACTOR
    }

    fn default_max_carbs() -> Decimal {
        defaults::MAX_CARBS
    }
}

impl Default for BolusSettings {
    fn default() -> Self {
        Self {
            units: GlucoseUnits::MgDl,
            override_factor: defaults::OVERRIDE_FACTOR,
            fatty_meal_factor: defaults::FATTY_MEAL_FACTOR,
            sweet_meal_factor: defaults::SWEET_MEAL_FACTOR,
            max_carbs: defaults::MAX_CARBS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_constants() {
        assert_eq!(defaults::MAX_COB, dec!(120));
        assert_eq!(defaults::AUTOSENS_MAX, dec!(1.2));
        assert_eq!(defaults::OVERRIDE_FACTOR, dec!(0.8));
        assert_eq!(defaults::FATTY_MEAL_FACTOR, dec!(0.7));
        assert_eq!(defaults::HALF_BASAL_EXERCISE_TARGET, dec!(160));
    }

    #[test]
    fn test_preferences_missing_fields_take_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{ "max_iob": 6 }"#).unwrap();
        assert_eq!(prefs.max_iob, dec!(6));
        assert_eq!(prefs.max_cob, dec!(120));
        assert_eq!(prefs.autosens_max, dec!(1.2));
        assert!(!prefs.exercise_mode);
    }

    #[test]
    fn test_pump_settings_oref_keys() {
        let pump: PumpSettings =
            serde_json::from_str(r#"{ "insulin_action_curve": 6, "maxBolus": 8, "maxBasal": 3 }"#).unwrap();
        assert_eq!(pump.max_bolus, dec!(8));
        assert_eq!(pump.max_basal, dec!(3));
    }

    #[test]
    fn test_bolus_settings_defaults() {
        let settings: BolusSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, BolusSettings::default());
        assert_eq!(settings.units, GlucoseUnits::MgDl);
    }
}
