//! Trio Core: data model, settings documents and errors shared by the
//! bolus calculator crates.
//!
//! Inputs are gathered into one immutable [`CalculationInput`] per request
//! and turned into a [`CalculationResult`] by `trio-bolus`.

pub mod context;
pub mod data_model;
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod verdict;

pub use context::CalculationContext;
pub use data_model::{BolusRequest, CalculationInput, CalculationResult, Determination, GlucoseSample};
pub use error::{Result, TrioError};
pub use settings::{BolusSettings, GlucoseUnits, Preferences, PumpSettings};
pub use verdict::{Clamp, SafetyGuard, SafetyVerdict};

/// Glucose (mg/dL) below which no bolus is ever recommended.
pub const HYPO_THRESHOLD_MG_DL: i64 = 54;

/// Minutes after the last successful loop before its IOB/COB are considered stale.
pub const LOOP_STALE_MINUTES: i64 = 15;
