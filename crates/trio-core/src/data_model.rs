//! Data Model: GlucoseSample, Determination, CalculationInput, CalculationResult
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::verdict::{SafetyGuard, SafetyVerdict};

/// One CGM reading in mg/dL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlucoseSample {
    pub date: DateTime<Utc>,
    pub glucose: i16,
}

impl GlucoseSample {
    pub fn new(date: DateTime<Utc>, glucose: i16) -> Self {
        Self { date, glucose }
    }
}

/// Snapshot of the dosing algorithm's output at one loop cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Determination {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub iob: Option<Decimal>,
    #[serde(default)]
    pub cob: i16,
    #[serde(default)]
    pub current_target: Option<Decimal>,
    #[serde(default)]
    pub insulin_sensitivity: Option<Decimal>,
    #[serde(default)]
    pub carb_ratio: Option<Decimal>,
    #[serde(default, rename = "eventualBG")]
    pub eventual_bg: Option<Decimal>,
    #[serde(default, rename = "minPredBG")]
    pub min_pred_bg: Option<Decimal>,
    #[serde(default)]
    pub insulin_req: Option<Decimal>,
    #[serde(default)]
    pub insulin_for_manual_bolus: Option<Decimal>,
}

impl Determination {
    /// Determination with nothing but a timestamp; every other field falls back.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            iob: None,
            cob: 0,
            current_target: None,
            insulin_sensitivity: None,
            carb_ratio: None,
            eventual_bg: None,
            min_pred_bg: None,
            insulin_req: None,
            insulin_for_manual_bolus: None,
        }
    }
}

/// What the caller asks for: a button press in the bolus view or a remote meal command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BolusRequest {
    /// Carbs about to be eaten, grams.
    pub carbs: Decimal,
    pub use_fatty_meal_correction: bool,
    pub use_super_bolus: bool,
    /// Last successful closed-loop cycle. `None` asks the loop clock.
    #[serde(default)]
    pub last_loop_date: Option<DateTime<Utc>>,
    /// Forecast minimum supplied by the caller; otherwise taken from the determination.
    #[serde(default, rename = "minPredBG")]
    pub min_pred_bg: Option<Decimal>,
}

impl BolusRequest {
    pub fn new(carbs: Decimal) -> Self {
        Self {
            carbs,
            use_fatty_meal_correction: false,
            use_super_bolus: false,
            last_loop_date: None,
            min_pred_bg: None,
        }
    }

    pub fn fatty_meal(mut self) -> Self {
        self.use_fatty_meal_correction = true;
        self
    }

    pub fn super_bolus(mut self) -> Self {
        self.use_super_bolus = true;
        self
    }

    pub fn last_loop(mut self, date: DateTime<Utc>) -> Self {
        self.last_loop_date = Some(date);
        self
    }

    pub fn with_min_pred_bg(mut self, value: Decimal) -> Self {
        self.min_pred_bg = Some(value);
        self
    }
}

/// Everything the dose calculator needs, gathered once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Carbs to be consumed, grams
    pub carbs: Decimal,
    /// Current glucose, mg/dL (zero when no reading exists)
    #[serde(rename = "currentBG")]
    pub current_bg: Decimal,
    /// Glucose change over the last 15 minutes
    #[serde(rename = "deltaBG")]
    pub delta_bg: Decimal,
    pub target: Decimal,
    pub isf: Decimal,
    pub carb_ratio: Decimal,
    pub iob: Decimal,
    pub cob: Decimal,
    pub use_fatty_meal_correction_factor: bool,
    pub fatty_meal_factor: Decimal,
    pub use_super_bolus: bool,
    pub sweet_meal_factor: Decimal,
    /// Scheduled basal rate, U/h
    pub basal: Decimal,
    /// General correction fraction applied to the whole calculation
    pub fraction: Decimal,
    pub max_bolus: Decimal,
    #[serde(rename = "maxIOB")]
    pub max_iob: Decimal,
    #[serde(rename = "maxCOB")]
    pub max_cob: Decimal,
    #[serde(rename = "minPredBG")]
    pub min_pred_bg: Decimal,
    pub last_loop_date: DateTime<Utc>,
}

impl CalculationInput {
    /// All-zero input with a neutral fraction; chain `with_*` calls to fill it in.
    pub fn new(last_loop_date: DateTime<Utc>) -> Self {
        Self {
            carbs: Decimal::ZERO,
            current_bg: Decimal::ZERO,
            delta_bg: Decimal::ZERO,
            target: Decimal::ZERO,
            isf: Decimal::ZERO,
            carb_ratio: Decimal::ZERO,
            iob: Decimal::ZERO,
            cob: Decimal::ZERO,
            use_fatty_meal_correction_factor: false,
            fatty_meal_factor: Decimal::ONE,
            use_super_bolus: false,
            sweet_meal_factor: Decimal::ZERO,
            basal: Decimal::ZERO,
            fraction: Decimal::ONE,
            max_bolus: Decimal::ZERO,
            max_iob: Decimal::ZERO,
            max_cob: Decimal::ZERO,
            min_pred_bg: Decimal::ZERO,
            last_loop_date,
        }
    }

    pub fn with_glucose(mut self, current_bg: Decimal, delta_bg: Decimal) -> Self {
        self.current_bg = current_bg;
        self.delta_bg = delta_bg;
        self
    }

    pub fn with_target(mut self, target: Decimal) -> Self {
        self.target = target;
        self
    }

    pub fn with_isf(mut self, isf: Decimal) -> Self {
        self.isf = isf;
        self
    }

    pub fn with_carb_ratio(mut self, carb_ratio: Decimal) -> Self {
        self.carb_ratio = carb_ratio;
        self
    }

    pub fn with_carbs(mut self, carbs: Decimal) -> Self {
        self.carbs = carbs;
        self
    }

    pub fn with_iob(mut self, iob: Decimal) -> Self {
        self.iob = iob;
        self
    }

    pub fn with_cob(mut self, cob: Decimal) -> Self {
        self.cob = cob;
        self
    }

    pub fn with_basal(mut self, basal: Decimal) -> Self {
        self.basal = basal;
        self
    }

    pub fn with_fraction(mut self, fraction: Decimal) -> Self {
        self.fraction = fraction;
        self
    }

    pub fn with_limits(mut self, max_bolus: Decimal, max_iob: Decimal, max_cob: Decimal) -> Self {
        self.max_bolus = max_bolus;
        self.max_iob = max_iob;
        self.max_cob = max_cob;
        self
    }

    pub fn with_min_pred_bg(mut self, min_pred_bg: Decimal) -> Self {
        self.min_pred_bg = min_pred_bg;
        self
    }

    pub fn fatty_meal(mut self, factor: Decimal) -> Self {
        self.use_fatty_meal_correction_factor = true;
        self.fatty_meal_factor = factor;
        self
    }

    pub fn super_bolus(mut self, sweet_meal_factor: Decimal) -> Self {
        self.use_super_bolus = true;
        self.sweet_meal_factor = sweet_meal_factor;
        self
    }
}

/// Final recommendation plus every intermediate term, for display and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Final recommendation after guards, limits and pump rounding
    pub insulin_calculated: Decimal,
    /// Total after fraction and meal adjustments
    pub factored_insulin: Decimal,
    /// Total before adjustments
    pub whole_calc: Decimal,
    pub correction_insulin: Decimal,
    pub iob_insulin_reduction: Decimal,
    pub super_bolus_insulin: Decimal,
    pub target_difference: Decimal,
    pub target_difference_insulin: Decimal,
    pub fifteen_minutes_insulin: Decimal,
    /// COB plus new carbs, capped at max COB
    pub whole_cob: Decimal,
    pub whole_cob_insulin: Decimal,
    pub safety: SafetyVerdict,
}

impl CalculationResult {
    /// The "no recommendation" result shown when inputs could not be gathered.
    pub fn zero() -> Self {
        Self {
            insulin_calculated: Decimal::ZERO,
            factored_insulin: Decimal::ZERO,
            whole_calc: Decimal::ZERO,
            correction_insulin: Decimal::ZERO,
            iob_insulin_reduction: Decimal::ZERO,
            super_bolus_insulin: Decimal::ZERO,
            target_difference: Decimal::ZERO,
            target_difference_insulin: Decimal::ZERO,
            fifteen_minutes_insulin: Decimal::ZERO,
            whole_cob: Decimal::ZERO,
            whole_cob_insulin: Decimal::ZERO,
            safety: SafetyVerdict::blocked(SafetyGuard::Unavailable),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.insulin_calculated.is_zero()
    }
}
