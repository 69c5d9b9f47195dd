//! Snapping picker values to their step size
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const MIN_OVERRIDE_PERCENTAGE: Decimal = dec!(10);
pub const MAX_OVERRIDE_PERCENTAGE: Decimal = dec!(200);

/// Snap an override percentage to a multiple of `step` measured from 100,
/// moving toward 100, then clamp to 10..=200.
///
/// Values already on a step are returned as-is. A zero step leaves
/// the percentage unchanged.
pub fn round_override_percentage_to_step(percentage: Decimal, step: u32) -> Decimal {
    let step = Decimal::from(step);
    if step.is_zero() || (percentage % step).is_zero() {
        return percentage;
    }

    let hundred = dec!(100);
    let rounded = if percentage > hundred {
        hundred + ((percentage - hundred) / step).floor() * step
    } else {
        hundred - ((hundred - percentage) / step).floor() * step
    };
    rounded.max(MIN_OVERRIDE_PERCENTAGE).min(MAX_OVERRIDE_PERCENTAGE)
}

/// Raise `target` to the next multiple of `step`; targets already on a step are unchanged.
pub fn round_target_to_step(target: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return target;
    }
    let remainder = target % step;
    if remainder.is_zero() {
        target
    } else {
        target + (step - remainder)
    }
}
