//! Half-basal-target sensitivity math
//!
//! A temp target away from 100 mg/dL scales insulin sensitivity by
//!
//! ```text
//! ratio = (hbt - 100) / ((hbt - 100) + (target - 100))
//! ```
//!
//! capped at `autosens_max`. [`compute_half_basal_target`] solves the same
//! equation for `hbt` given a chosen percentage.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

/// The neutral target every adjustment is measured from, mg/dL.
pub const NORMAL_TARGET: Decimal = dec!(100);

/// Sensitivity ratio for `temp_target` under `half_basal_target`, in `(0, autosens_max]`.
///
/// When the deviation and the adjustment factor disagree in sign (or either
/// is zero) the formula has no meaningful answer and `autosens_max` is returned.
pub fn adjustment_ratio(half_basal_target: Decimal, temp_target: Decimal, autosens_max: Decimal) -> Decimal {
    let deviation = half_basal_target - NORMAL_TARGET;
    let adjustment_factor = deviation + (temp_target - NORMAL_TARGET);

    let ratio = if deviation * adjustment_factor <= Decimal::ZERO {
        autosens_max
    } else {
        deviation.checked_div(adjustment_factor).unwrap_or(autosens_max)
    };
    ratio.min(autosens_max)
}

/// [`adjustment_ratio`] as a whole percentage.
pub fn compute_adjusted_percentage(
    half_basal_target: Decimal,
    temp_target: Decimal,
    autosens_max: Decimal,
) -> Decimal {
    let ratio = adjustment_ratio(half_basal_target, temp_target, autosens_max);
    round_half_away(ratio * dec!(100))
}

/// Half-basal target that makes `temp_target` yield `percentage`, rounded to mg/dL.
///
/// At 100 % the equation is singular and `current_hbt` is returned unchanged.
pub fn compute_half_basal_target(temp_target: Decimal, percentage: Decimal, current_hbt: Decimal) -> Decimal {
    let ratio = percentage / dec!(100);
    if ratio == Decimal::ONE {
        return round_half_away(current_hbt);
    }

    let numerator = dec!(2) * ratio * NORMAL_TARGET - NORMAL_TARGET - ratio * temp_target;
    match numerator.checked_div(ratio - Decimal::ONE) {
        Some(hbt) => {
            debug!(%temp_target, %percentage, %hbt, "half basal target");
            round_half_away(hbt)
        }
        None => round_half_away(current_hbt),
    }
}

pub(crate) fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
