//! Therapy profile: the four schedules the bolus calculator reads.
//!
//! Struct layouts follow the oref JSON documents (`basal_profile.json`,
//! `carb_ratios.json`, `bg_targets.json`, `insulin_sensitivities.json`).

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trio_core::GlucoseUnits;

use crate::schedule::Schedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasalProfileEntry {
    pub start: String,
    #[serde(default)]
    pub minutes: u32,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CarbUnits {
    #[default]
    Grams,
    Exchanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbRatioEntry {
    pub start: String,
    #[serde(default)]
    pub offset: u32,
    pub ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CarbRatios {
    #[serde(default)]
    pub units: CarbUnits,
    #[serde(default)]
    pub schedule: Vec<CarbRatioEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgTargetEntry {
    pub start: String,
    #[serde(default)]
    pub offset: u32,
    pub low: Decimal,
    pub high: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BgTargets {
    #[serde(default)]
    pub units: GlucoseUnits,
    #[serde(default)]
    pub user_preferred_units: GlucoseUnits,
    #[serde(default)]
    pub targets: Vec<BgTargetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsulinSensitivityEntry {
    pub start: String,
    #[serde(default)]
    pub offset: u32,
    pub sensitivity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InsulinSensitivities {
    #[serde(default)]
    pub units: GlucoseUnits,
    #[serde(default)]
    pub user_preferred_units: GlucoseUnits,
    #[serde(default)]
    pub sensitivities: Vec<InsulinSensitivityEntry>,
}

/// Which schedule to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingType {
    Basal,
    CarbRatio,
    /// Lower bound of the BG target range
    BgTarget,
    Isf,
}

/// The four schedules together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TherapyProfile {
    pub basal_profile: Vec<BasalProfileEntry>,
    pub carb_ratios: CarbRatios,
    pub bg_targets: BgTargets,
    pub insulin_sensitivities: InsulinSensitivities,
}

/// Values active at one moment, zero where a schedule is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileValues {
    pub basal: Decimal,
    pub carb_ratio: Decimal,
    pub bg_target: Decimal,
    pub isf: Decimal,
}

impl TherapyProfile {
    pub fn schedule(&self, setting: SettingType) -> Schedule {
        match setting {
            SettingType::Basal => Schedule::from_entries(
                self.basal_profile.iter().map(|e| (e.start.as_str(), e.rate)),
            ),
            SettingType::CarbRatio => Schedule::from_entries(
                self.carb_ratios.schedule.iter().map(|e| (e.start.as_str(), e.ratio)),
            ),
            SettingType::BgTarget => Schedule::from_entries(
                self.bg_targets.targets.iter().map(|e| (e.start.as_str(), e.low)),
            ),
            SettingType::Isf => Schedule::from_entries(
                self.insulin_sensitivities
                    .sensitivities
                    .iter()
                    .map(|e| (e.start.as_str(), e.sensitivity)),
            ),
        }
    }

    /// Current value of one setting; zero when its schedule has no usable entry.
    pub fn current_value(&self, setting: SettingType, time: NaiveTime) -> Decimal {
        self.schedule(setting).value_at(time).unwrap_or(Decimal::ZERO)
    }

    pub fn values_at(&self, time: NaiveTime) -> ProfileValues {
        ProfileValues {
            basal: self.current_value(SettingType::Basal, time),
            carb_ratio: self.current_value(SettingType::CarbRatio, time),
            bg_target: self.current_value(SettingType::BgTarget, time),
            isf: self.current_value(SettingType::Isf, time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile() -> TherapyProfile {
        let basal_profile: Vec<BasalProfileEntry> = serde_json::from_str(
            r#"[
                {"start": "00:00:00", "minutes": 0, "rate": 0.9},
                {"start": "07:00:00", "minutes": 420, "rate": 1.1}
            ]"#,
        )
        .unwrap();
        let carb_ratios: CarbRatios = serde_json::from_str(
            r#"{"units": "grams", "schedule": [
                {"start": "00:00", "offset": 0, "ratio": 12},
                {"start": "11:00", "offset": 660, "ratio": 9}
            ]}"#,
        )
        .unwrap();
        let bg_targets: BgTargets = serde_json::from_str(
            r#"{"units": "mg/dL", "user_preferred_units": "mg/dL", "targets": [
                {"start": "00:00", "offset": 0, "low": 110, "high": 110},
                {"start": "08:00", "offset": 480, "low": 100, "high": 120}
            ]}"#,
        )
        .unwrap();
        let insulin_sensitivities: InsulinSensitivities = serde_json::from_str(
            r#"{"units": "mg/dL", "user_preferred_units": "mg/dL", "sensitivities": [
                {"start": "00:00", "offset": 0, "sensitivity": 50}
            ]}"#,
        )
        .unwrap();

        TherapyProfile {
            basal_profile,
            carb_ratios,
            bg_targets,
            insulin_sensitivities,
        }
    }

    #[test]
    fn test_values_at_morning() {
        let values = profile().values_at(NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(values.basal, dec!(1.1));
        assert_eq!(values.carb_ratio, dec!(12));
        assert_eq!(values.bg_target, dec!(100));
        assert_eq!(values.isf, dec!(50));
    }

    #[test]
    fn test_values_at_night() {
        let values = profile().values_at(NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(values.basal, dec!(0.9));
        assert_eq!(values.bg_target, dec!(110));
    }

    #[test]
    fn test_empty_profile_is_all_zero() {
        let values = TherapyProfile::default().values_at(NaiveTime::from_hms_opt(2, 0, 0).unwrap());
        assert_eq!(values, ProfileValues::default());
    }
}
