//! Insulin Dose Calculator
//!
//! A pure function over [`CalculationInput`]. Steps, in order:
//!
//! 1. correction for the distance from target
//! 2. trend correction for the last 15 minutes
//! 3. carb coverage for COB plus new carbs, capped at max COB
//! 4. IOB reduction
//! 5. combination (three branches, see [`combine`])
//! 6. correction fraction
//! 7. fatty-meal factor, or else super bolus
//! 8. hypoglycemia and stale-loop guards
//! 9. clamps: zero floor, max bolus, max IOB headroom, pump rounding
//!
//! Guards and clamps are applied last and cannot be bypassed by any earlier term.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use trio_core::{
    CalculationInput, CalculationResult, Clamp, SafetyGuard, SafetyVerdict, HYPO_THRESHOLD_MG_DL,
    LOOP_STALE_MINUTES,
};

use crate::rounding::BolusRounding;

/// Run the full calculation.
pub fn calculate_insulin(
    input: &CalculationInput,
    now: DateTime<Utc>,
    rounding: &dyn BolusRounding,
) -> CalculationResult {
    // 1
    let target_difference = input.current_bg - input.target;
    let target_difference_insulin = per_unit(target_difference, input.isf);
    debug!(%target_difference, %target_difference_insulin, "target difference");

    // 2
    let fifteen_minutes_insulin = per_unit(input.delta_bg, input.isf);
    debug!(delta_bg = %input.delta_bg, %fifteen_minutes_insulin, "trend");

    // 3
    let whole_cob = (input.cob + input.carbs).min(input.max_cob);
    let whole_cob_insulin = per_unit(whole_cob, input.carb_ratio);
    debug!(%whole_cob, %whole_cob_insulin, "carb coverage");

    // 4
    let iob_insulin_reduction = -input.iob;

    // 5
    let whole_calc = combine(
        input,
        target_difference_insulin,
        iob_insulin_reduction,
        whole_cob_insulin,
        fifteen_minutes_insulin,
    );

    // 6, 7
    let mut factored_insulin = whole_calc * input.fraction;
    let mut super_bolus_insulin = Decimal::ZERO;
    if input.use_fatty_meal_correction_factor {
        factored_insulin *= input.fatty_meal_factor;
    } else if input.use_super_bolus {
        super_bolus_insulin = input.sweet_meal_factor * input.basal;
        factored_insulin += super_bolus_insulin;
    }
    debug!(%whole_calc, fraction = %input.fraction, %factored_insulin, %super_bolus_insulin, "factored");

    // 8, 9
    let (insulin_calculated, safety) = match safety_guard(input, now) {
        Some(guard) => {
            info!(%guard, "bolus recommendation blocked");
            (Decimal::ZERO, SafetyVerdict::blocked(guard))
        }
        None => clamp_to_limits(factored_insulin, input, rounding),
    };
    debug!(%insulin_calculated, %safety, "recommendation");

    CalculationResult {
        insulin_calculated,
        factored_insulin,
        whole_calc,
        correction_insulin: target_difference_insulin,
        iob_insulin_reduction,
        super_bolus_insulin,
        target_difference,
        target_difference_insulin,
        fifteen_minutes_insulin,
        whole_cob,
        whole_cob_insulin,
        safety,
    }
}

/// Insulin units for `amount` at `per_unit_ratio` (mg/dL per U or g per U).
/// Zero when the ratio is not positive.
fn per_unit(amount: Decimal, per_unit_ratio: Decimal) -> Decimal {
    if per_unit_ratio <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount.checked_div(per_unit_ratio).unwrap_or(Decimal::ZERO)
}

/// Step 5.
///
/// A delta of exactly zero drops the trend term. With no glucose reading
/// (current BG zero) only IOB and carbs count.
fn combine(
    input: &CalculationInput,
    target_difference_insulin: Decimal,
    iob_insulin_reduction: Decimal,
    whole_cob_insulin: Decimal,
    fifteen_minutes_insulin: Decimal,
) -> Decimal {
    if !input.delta_bg.is_zero() {
        target_difference_insulin + iob_insulin_reduction + whole_cob_insulin + fifteen_minutes_insulin
    } else if input.current_bg.is_zero() {
        iob_insulin_reduction + whole_cob_insulin
    } else {
        target_difference_insulin + iob_insulin_reduction + whole_cob_insulin
    }
}

/// First guard that forbids any dose, if one applies.
pub fn safety_guard(input: &CalculationInput, now: DateTime<Utc>) -> Option<SafetyGuard> {
    let hypo = Decimal::from(HYPO_THRESHOLD_MG_DL);
    if input.current_bg < hypo {
        return Some(SafetyGuard::LowGlucose);
    }
    if input.min_pred_bg < hypo {
        return Some(SafetyGuard::LowForecast);
    }
    if is_loop_stale(input.last_loop_date, now) {
        return Some(SafetyGuard::StaleLoop);
    }
    if input.isf <= Decimal::ZERO || input.carb_ratio <= Decimal::ZERO {
        return Some(SafetyGuard::InvalidProfile);
    }
    None
}

pub fn is_loop_stale(last_loop_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(last_loop_date) > Duration::minutes(LOOP_STALE_MINUTES)
}

/// Step 9. Every clamp that changes the value is recorded in the verdict.
fn clamp_to_limits(
    factored_insulin: Decimal,
    input: &CalculationInput,
    rounding: &dyn BolusRounding,
) -> (Decimal, SafetyVerdict) {
    let mut verdict = SafetyVerdict::allowed();
    let mut insulin = factored_insulin;

    if insulin < Decimal::ZERO {
        insulin = Decimal::ZERO;
        verdict.clamp(Clamp::Negative);
    }

    if insulin > input.max_bolus {
        insulin = input.max_bolus.max(Decimal::ZERO);
        verdict.clamp(Clamp::MaxBolus);
    }

    let headroom = (input.max_iob - input.iob).max(Decimal::ZERO);
    if insulin > headroom {
        insulin = headroom;
        verdict.clamp(Clamp::MaxIob);
    }

    // rounding may only lower the dose
    let rounded = rounding.round_bolus(insulin).min(insulin).max(Decimal::ZERO);
    if rounded != insulin {
        verdict.clamp(Clamp::Rounded);
    }

    (rounded, verdict)
}
