//! Trio Bolus: manual bolus recommendation
//!
//! - [`aggregate`]: glucose history and determination → calculator scalars
//! - [`calculator`]: the pure dose calculation with its guards and clamps
//! - [`manager`]: async gather-then-calculate orchestration
//! - [`provider`] / [`file_provider`]: where inputs come from
//! - [`rounding`]: pump increment rounding

pub mod aggregate;
pub mod calculator;
pub mod file_provider;
pub mod manager;
pub mod provider;
pub mod rounding;

pub use aggregate::{bolus_variables, glucose_variables, BolusVariables, DeltaStrategy, GlucoseVariables};
pub use calculator::{calculate_insulin, is_loop_stale, safety_guard};
pub use file_provider::FileSettingsProvider;
pub use manager::{BolusCalculationManager, ManagerConfig, RECENT_WINDOW_FETCH_LIMIT};
pub use provider::{
    DeterminationProvider, FixedLoopClock, GlucoseProvider, InMemoryDeterminationStore, InMemoryGlucoseStore,
    InMemorySettings, LoopClock, SettingsProvider,
};
pub use rounding::{BolusRounding, NoRounding, PumpIncrementRounder};
