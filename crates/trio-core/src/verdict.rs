//! Safety verdicts for a bolus recommendation
//!
//! Records whether the dose math was allowed to produce a value and which
//! limits shaped it, so the breakdown shown to the user can say why.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the safety stage of a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyVerdict {
    /// Dose math ran; `clamps` lists every limit that changed the value, in order
    Allowed {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        clamps: Vec<Clamp>,
    },

    /// A guard forced the recommendation to zero
    Blocked {
        guard: SafetyGuard,
    },
}

impl SafetyVerdict {
    pub fn allowed() -> Self {
        SafetyVerdict::Allowed { clamps: Vec::new() }
    }

    pub fn blocked(guard: SafetyGuard) -> Self {
        SafetyVerdict::Blocked { guard }
    }

    /// Record a clamp. Has no effect on a blocked verdict.
    pub fn clamp(&mut self, clamp: Clamp) {
        if let SafetyVerdict::Allowed { clamps } = self {
            clamps.push(clamp);
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, SafetyVerdict::Allowed { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, SafetyVerdict::Blocked { .. })
    }

    pub fn guard(&self) -> Option<SafetyGuard> {
        match self {
            SafetyVerdict::Blocked { guard } => Some(*guard),
            SafetyVerdict::Allowed { .. } => None,
        }
    }

    pub fn clamps(&self) -> &[Clamp] {
        match self {
            SafetyVerdict::Allowed { clamps } => clamps,
            SafetyVerdict::Blocked { .. } => &[],
        }
    }

    pub fn was_clamped_by(&self, clamp: Clamp) -> bool {
        self.clamps().contains(&clamp)
    }
}

impl Default for SafetyVerdict {
    fn default() -> Self {
        Self::allowed()
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyVerdict::Allowed { clamps } if clamps.is_empty() => write!(f, "ALLOWED"),
            SafetyVerdict::Allowed { clamps } => {
                let names: Vec<String> = clamps.iter().map(|c| c.to_string()).collect();
                write!(f, "ALLOWED (clamped: {})", names.join(", "))
            }
            SafetyVerdict::Blocked { guard } => write!(f, "BLOCKED: {}", guard),
        }
    }
}

/// Unconditional guards that zero the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyGuard {
    /// Current glucose below the hypoglycemia threshold
    LowGlucose,
    /// Forecast minimum glucose below the hypoglycemia threshold
    LowForecast,
    /// Last successful loop too old to trust IOB/COB
    StaleLoop,
    /// ISF or carb ratio is not positive
    InvalidProfile,
    /// Inputs could not be gathered
    Unavailable,
}

impl SafetyGuard {
    pub fn description(&self) -> &'static str {
        match self {
            SafetyGuard::LowGlucose => "current glucose below 54 mg/dL",
            SafetyGuard::LowForecast => "forecast glucose below 54 mg/dL",
            SafetyGuard::StaleLoop => "last loop older than 15 minutes",
            SafetyGuard::InvalidProfile => "insulin sensitivity or carb ratio not set",
            SafetyGuard::Unavailable => "calculation inputs unavailable",
        }
    }
}

impl fmt::Display for SafetyGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Limits that can lower the computed dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Clamp {
    /// Negative total raised to zero
    Negative,
    MaxBolus,
    /// Lowered to the remaining max-IOB headroom
    MaxIob,
    /// Rounded down to a deliverable pump increment
    Rounded,
}

impl fmt::Display for Clamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clamp::Negative => write!(f, "NEGATIVE"),
            Clamp::MaxBolus => write!(f, "MAX_BOLUS"),
            Clamp::MaxIob => write!(f, "MAX_IOB"),
            Clamp::Rounded => write!(f, "ROUNDED"),
        }
    }
}
