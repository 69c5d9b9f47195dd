//! Bolus Calculation Manager: gather inputs, then run the pure calculator
//!
//! Two phases. `prepare_calculation_input` fetches settings, glucose and the
//! latest determination concurrently and folds them into one
//! [`CalculationInput`]. `handle_bolus_calculation` runs the calculator on it.
//! Any fetch failure short-circuits to [`CalculationResult::zero`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use trio_core::{BolusRequest, CalculationContext, CalculationInput, CalculationResult, Result};

use crate::aggregate::{bolus_variables, glucose_variables, DeltaStrategy, DETERMINATION_WINDOW_MINUTES};
use crate::calculator::calculate_insulin;
use crate::provider::{DeterminationProvider, GlucoseProvider, LoopClock, SettingsProvider};
use crate::rounding::BolusRounding;

/// Readings fetched for a time-window delta: one day of 5-minute history.
/// The window filter trims by timestamp afterwards.
pub const RECENT_WINDOW_FETCH_LIMIT: usize = 288;

/// Tuning knobs for input gathering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Readings requested from the glucose provider
    pub glucose_fetch_limit: usize,
    pub determination_window: Duration,
    pub delta_strategy: DeltaStrategy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            glucose_fetch_limit: 3,
            determination_window: Duration::minutes(DETERMINATION_WINDOW_MINUTES),
            delta_strategy: DeltaStrategy::SampleIndex,
        }
    }
}

impl ManagerConfig {
    /// Time-based delta over `window`.
    ///
    /// The fetch covers the whole window even at a 1-minute CGM cadence.
    pub fn recent_window(window: Duration) -> Self {
        let per_minute = window.num_minutes().max(0) as usize + 1;
        Self {
            glucose_fetch_limit: per_minute.max(RECENT_WINDOW_FETCH_LIMIT),
            delta_strategy: DeltaStrategy::RecentWindow(window),
            ..Self::default()
        }
    }
}

pub struct BolusCalculationManager {
    settings: Arc<dyn SettingsProvider>,
    glucose: Arc<dyn GlucoseProvider>,
    determinations: Arc<dyn DeterminationProvider>,
    loop_clock: Arc<dyn LoopClock>,
    rounding: Arc<dyn BolusRounding>,
    config: ManagerConfig,
}

impl BolusCalculationManager {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        glucose: Arc<dyn GlucoseProvider>,
        determinations: Arc<dyn DeterminationProvider>,
        loop_clock: Arc<dyn LoopClock>,
        rounding: Arc<dyn BolusRounding>,
    ) -> Self {
        Self {
            settings,
            glucose,
            determinations,
            loop_clock,
            rounding,
            config: ManagerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Gather everything the calculator needs.
    ///
    /// Fetches run concurrently; the first error aborts the gather.
    pub async fn prepare_calculation_input(
        &self,
        request: &BolusRequest,
        ctx: &CalculationContext,
    ) -> Result<CalculationInput> {
        let start = Instant::now();
        let since = ctx.now - self.config.determination_window;

        let (preferences, pump, bolus_settings, profile, samples, determination) = tokio::try_join!(
            self.settings.preferences(),
            self.settings.pump_settings(),
            self.settings.bolus_settings(),
            self.settings.therapy_profile(),
            self.glucose.recent_glucose(self.config.glucose_fetch_limit),
            self.determinations.latest_determination(since),
        )?;
        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            readings = samples.len(),
            has_determination = determination.is_some(),
            "inputs gathered"
        );

        let schedule = profile.values_at(ctx.local_time());
        let glucose = glucose_variables(&samples, self.config.delta_strategy, ctx.now);
        let vars = bolus_variables(
            determination.as_ref(),
            schedule,
            ctx.now,
            self.config.determination_window,
        );

        let carbs = request.carbs.min(bolus_settings.max_carbs);
        if carbs < request.carbs {
            warn!(requested = %request.carbs, max_carbs = %bolus_settings.max_carbs, "carbs capped");
        }

        let mut input = CalculationInput::new(self.last_loop_date(request))
            .with_carbs(carbs)
            .with_glucose(glucose.current_bg, glucose.delta_bg)
            .with_target(vars.target)
            .with_isf(vars.isf)
            .with_carb_ratio(vars.carb_ratio)
            .with_iob(vars.iob)
            .with_cob(vars.cob)
            .with_basal(vars.basal)
            .with_fraction(bolus_settings.override_factor)
            .with_limits(pump.max_bolus, preferences.max_iob, preferences.max_cob)
            .with_min_pred_bg(request.min_pred_bg.unwrap_or(vars.min_pred_bg));
        input.fatty_meal_factor = bolus_settings.fatty_meal_factor;
        input.sweet_meal_factor = bolus_settings.sweet_meal_factor;
        input.use_fatty_meal_correction_factor = request.use_fatty_meal_correction;
        input.use_super_bolus = request.use_super_bolus;

        Ok(input)
    }

    /// Pure calculation on an already-gathered input
    pub fn calculate_insulin(&self, input: &CalculationInput, ctx: &CalculationContext) -> CalculationResult {
        calculate_insulin(input, ctx.now, self.rounding.as_ref())
    }

    /// Gather and calculate. Never fails: unavailable inputs give the zero result.
    pub async fn handle_bolus_calculation(
        &self,
        request: &BolusRequest,
        ctx: &CalculationContext,
    ) -> CalculationResult {
        let span = info_span!("bolus_calculation", trace_id = %ctx.trace_id, origin = %ctx.origin);
        async {
            match self.prepare_calculation_input(request, ctx).await {
                Ok(input) => {
                    let result = self.calculate_insulin(&input, ctx);
                    info!(
                        insulin = %result.insulin_calculated,
                        safety = %result.safety,
                        "bolus recommendation"
                    );
                    result
                }
                Err(e) => {
                    warn!(code = e.code(), error = %e, "calculation inputs unavailable");
                    CalculationResult::zero()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// The request's loop date, else the clock's. With neither, the loop is
    /// treated as never having run.
    fn last_loop_date(&self, request: &BolusRequest) -> DateTime<Utc> {
        request
            .last_loop_date
            .or_else(|| self.loop_clock.last_loop_date())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FixedLoopClock, InMemoryDeterminationStore, InMemoryGlucoseStore, InMemorySettings};
    use crate::rounding::NoRounding;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trio_core::{GlucoseSample, SafetyGuard};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ctx() -> CalculationContext {
        CalculationContext::at("test", now(), FixedOffset::east_opt(0).unwrap())
    }

    fn manager(samples: Vec<GlucoseSample>, last_loop: Option<DateTime<Utc>>) -> BolusCalculationManager {
        BolusCalculationManager::new(
            Arc::new(InMemorySettings::default()),
            Arc::new(InMemoryGlucoseStore::new(samples)),
            Arc::new(InMemoryDeterminationStore::default()),
            Arc::new(FixedLoopClock::new(last_loop)),
            Arc::new(NoRounding),
        )
    }

    #[tokio::test]
    async fn test_prepare_uses_settings_defaults() {
        let samples = vec![GlucoseSample::new(now(), 140)];
        let input = manager(samples, Some(now()))
            .prepare_calculation_input(&BolusRequest::new(dec!(30)), &ctx())
            .await
            .unwrap();

        assert_eq!(input.current_bg, dec!(140));
        assert_eq!(input.carbs, dec!(30));
        assert_eq!(input.fraction, dec!(0.8));
        assert_eq!(input.max_bolus, dec!(10));
        assert_eq!(input.max_cob, dec!(120));
        assert_eq!(input.last_loop_date, now());
    }

    #[tokio::test]
    async fn test_carbs_capped_at_max_carbs() {
        let input = manager(vec![], Some(now()))
            .prepare_calculation_input(&BolusRequest::new(dec!(400)), &ctx())
            .await
            .unwrap();
        assert_eq!(input.carbs, dec!(250));
    }

    #[tokio::test]
    async fn test_missing_loop_date_is_stale() {
        let samples = vec![GlucoseSample::new(now(), 140)];
        let result = manager(samples, None)
            .handle_bolus_calculation(&BolusRequest::new(dec!(30)), &ctx())
            .await;
        assert_eq!(result.insulin_calculated, Decimal::ZERO);
        assert_eq!(result.safety.guard(), Some(SafetyGuard::StaleLoop));
    }

    #[tokio::test]
    async fn test_request_loop_date_wins_over_clock() {
        let request = BolusRequest::new(dec!(10)).last_loop(now() - Duration::minutes(2));
        let input = manager(vec![], Some(now() - Duration::hours(2)))
            .prepare_calculation_input(&request, &ctx())
            .await
            .unwrap();
        assert_eq!(input.last_loop_date, now() - Duration::minutes(2));
    }

    #[tokio::test]
    async fn test_recent_window_covers_one_minute_cadence() {
        let samples = (0..30)
            .map(|i| GlucoseSample::new(now() - Duration::minutes(i), 200 - 2 * i as i16))
            .collect();
        let input = manager(samples, Some(now()))
            .with_config(ManagerConfig::recent_window(Duration::minutes(20)))
            .prepare_calculation_input(&BolusRequest::new(Decimal::ZERO), &ctx())
            .await
            .unwrap();

        // newest minus the reading 19 minutes earlier
        assert_eq!(input.current_bg, dec!(200));
        assert_eq!(input.delta_bg, dec!(38));
    }

    #[test]
    fn test_recent_window_fetch_limit() {
        assert_eq!(
            ManagerConfig::recent_window(Duration::minutes(20)).glucose_fetch_limit,
            RECENT_WINDOW_FETCH_LIMIT
        );
        assert_eq!(ManagerConfig::recent_window(Duration::hours(6)).glucose_fetch_limit, 361);
    }

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.determination_window, Duration::minutes(30));
        assert_eq!(config.delta_strategy, DeltaStrategy::SampleIndex);
    }
}
