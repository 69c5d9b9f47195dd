//! Trio Adjust: temp target and override sensitivity math
//!
//! A temp target above or below 100 mg/dL can scale insulin sensitivity
//! through the half-basal target. These helpers convert between the
//! half-basal target and the percentage a user sees, and bound the
//! percentages the user may choose.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use trio_adjust::{compute_adjusted_percentage, compute_half_basal_target};
//!
//! let pct = compute_adjusted_percentage(dec!(160), dec!(120), dec!(1.2));
//! assert_eq!(pct, dec!(75));
//! assert_eq!(compute_half_basal_target(dec!(120), pct, dec!(160)), dec!(160));
//! ```

pub mod sensitivity;
pub mod slider;
pub mod step;
pub mod temp_target;

pub use sensitivity::{adjustment_ratio, compute_adjusted_percentage, compute_half_basal_target, NORMAL_TARGET};
pub use slider::{
    compute_slider_high, compute_slider_low, is_adjust_sens_enabled, slider_range, PercentageRange, TargetBehavior,
};
pub use step::{round_override_percentage_to_step, round_target_to_step};
pub use temp_target::{effective_preferences, TempTarget};
