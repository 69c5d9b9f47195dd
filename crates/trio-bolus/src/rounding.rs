//! Pump increment rounding
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Turns a computed dose into one the pump can deliver.
///
/// Implementations must never return more than they were given.
pub trait BolusRounding: Send + Sync {
    fn round_bolus(&self, amount: Decimal) -> Decimal;
}

/// Rounds down to the pump's bolus increment and caps at the pump's max bolus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpIncrementRounder {
    /// Smallest deliverable step (0.05 U on most patch pumps, 0.1 U on older ones)
    pub increment: Decimal,
    pub max_bolus: Decimal,
}

impl PumpIncrementRounder {
    pub fn new(increment: Decimal, max_bolus: Decimal) -> Self {
        Self {
            increment,
            max_bolus,
        }
    }

    fn round_down(&self, amount: Decimal) -> Decimal {
        if self.increment <= Decimal::ZERO {
            return amount;
        }
        match amount.checked_div(self.increment) {
            Some(steps) => steps.floor() * self.increment,
            None => Decimal::ZERO,
        }
    }
}

impl BolusRounding for PumpIncrementRounder {
    fn round_bolus(&self, amount: Decimal) -> Decimal {
        let rounded = self.round_down(amount);
        rounded.min(self.round_down(self.max_bolus)).normalize()
    }
}

/// Pass-through for pumps that report no increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRounding;

impl BolusRounding for NoRounding {
    fn round_bolus(&self, amount: Decimal) -> Decimal {
        amount
    }
}
