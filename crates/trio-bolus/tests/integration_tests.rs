//! Integration tests for the bolus manager with file-backed settings.
//!
//! Settings come from `testing/fixtures/settings`, glucose and determinations
//! from in-memory stores.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trio_bolus::{
    BolusCalculationManager, DeterminationProvider, FileSettingsProvider, FixedLoopClock, GlucoseProvider,
    InMemoryDeterminationStore, InMemoryGlucoseStore, ManagerConfig, PumpIncrementRounder, SettingsProvider,
    RECENT_WINDOW_FETCH_LIMIT,
};
use trio_core::{
    BolusRequest, CalculationContext, Clamp, Determination, GlucoseSample, Result, SafetyGuard, TrioError,
};

const FIXTURES: &str = "testing/fixtures/settings";

fn fixtures_path() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .map(|root| root.join(FIXTURES))
        .unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn ctx() -> CalculationContext {
    CalculationContext::at("bolus-view", now(), FixedOffset::east_opt(0).unwrap())
}

fn rising_glucose() -> Vec<GlucoseSample> {
    vec![
        GlucoseSample::new(now(), 150),
        GlucoseSample::new(now() - Duration::minutes(5), 148),
        GlucoseSample::new(now() - Duration::minutes(10), 144),
    ]
}

fn fresh_determination() -> Determination {
    Determination {
        iob: Some(dec!(0.5)),
        cob: 0,
        min_pred_bg: Some(dec!(110)),
        eventual_bg: Some(dec!(160)),
        ..Determination::empty(now() - Duration::minutes(3))
    }
}

fn manager_with(
    glucose: Arc<dyn GlucoseProvider>,
    determinations: Arc<dyn DeterminationProvider>,
) -> BolusCalculationManager {
    BolusCalculationManager::new(
        Arc::new(FileSettingsProvider::new(fixtures_path())),
        glucose,
        determinations,
        Arc::new(FixedLoopClock::new(Some(now() - Duration::minutes(2)))),
        Arc::new(PumpIncrementRounder::new(dec!(0.05), dec!(8))),
    )
}

fn manager() -> BolusCalculationManager {
    manager_with(
        Arc::new(InMemoryGlucoseStore::new(rising_glucose())),
        Arc::new(InMemoryDeterminationStore::new(vec![fresh_determination()])),
    )
}

struct UnavailableGlucose;

#[async_trait]
impl GlucoseProvider for UnavailableGlucose {
    async fn recent_glucose(&self, _limit: usize) -> Result<Vec<GlucoseSample>> {
        Err(TrioError::FetchError("glucose store unavailable".to_string()))
    }
}

struct UnavailableDeterminations;

#[async_trait]
impl DeterminationProvider for UnavailableDeterminations {
    async fn latest_determination(&self, _since: DateTime<Utc>) -> Result<Option<Determination>> {
        Err(TrioError::FetchError("determination store unavailable".to_string()))
    }
}

// =============================================================================
// Gathering
// =============================================================================

#[tokio::test]
async fn test_fixture_settings_load() {
    let provider = FileSettingsProvider::new(fixtures_path());
    let prefs = provider.preferences().await.unwrap();
    assert_eq!(prefs.max_iob, dec!(5));

    let pump = provider.pump_settings().await.unwrap();
    assert_eq!(pump.max_bolus, dec!(8));

    let profile = provider.therapy_profile().await.unwrap();
    assert_eq!(profile.basal_profile.len(), 3);
    assert_eq!(profile.carb_ratios.schedule.len(), 2);
}

#[tokio::test]
async fn test_prepare_merges_all_sources() {
    let input = manager()
        .prepare_calculation_input(&BolusRequest::new(dec!(30)), &ctx())
        .await
        .unwrap();

    assert_eq!(input.current_bg, dec!(150));
    assert_eq!(input.delta_bg, dec!(6));
    assert_eq!(input.iob, dec!(0.5));
    assert_eq!(input.min_pred_bg, dec!(110));
    // 09:00 local
    assert_eq!(input.basal, dec!(1.0));
    assert_eq!(input.carb_ratio, dec!(10));
    assert_eq!(input.target, dec!(100));
    assert_eq!(input.isf, dec!(50));
    assert_eq!(input.max_bolus, dec!(8));
    assert_eq!(input.max_iob, dec!(5));
    assert_eq!(input.fraction, dec!(1));
}

#[tokio::test]
async fn test_stale_determination_is_ignored() {
    let old = Determination {
        iob: Some(dec!(4)),
        cob: 50,
        ..Determination::empty(now() - Duration::minutes(45))
    };
    let manager = manager_with(
        Arc::new(InMemoryGlucoseStore::new(rising_glucose())),
        Arc::new(InMemoryDeterminationStore::new(vec![old])),
    );
    let input = manager
        .prepare_calculation_input(&BolusRequest::new(dec!(30)), &ctx())
        .await
        .unwrap();

    assert_eq!(input.iob, Decimal::ZERO);
    assert_eq!(input.cob, Decimal::ZERO);
    assert_eq!(input.min_pred_bg, Decimal::ZERO);
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_meal_bolus_end_to_end() {
    let result = manager()
        .handle_bolus_calculation(&BolusRequest::new(dec!(30)), &ctx())
        .await;

    // 1 correction + 0.12 trend + 3 carbs - 0.5 IOB
    assert_eq!(result.whole_calc, dec!(3.62));
    assert_eq!(result.insulin_calculated, dec!(3.6));
    assert_eq!(result.safety.clamps(), &[Clamp::Rounded]);
}

#[tokio::test]
async fn test_super_bolus_end_to_end() {
    let result = manager()
        .handle_bolus_calculation(&BolusRequest::new(dec!(30)).super_bolus(), &ctx())
        .await;

    assert_eq!(result.super_bolus_insulin, dec!(1.0));
    assert_eq!(result.factored_insulin, dec!(4.62));
    assert_eq!(result.insulin_calculated, dec!(4.5));
    assert!(result.safety.was_clamped_by(Clamp::MaxIob));
}

#[tokio::test]
async fn test_low_forecast_from_request_blocks() {
    let request = BolusRequest::new(dec!(30)).with_min_pred_bg(dec!(50));
    let result = manager().handle_bolus_calculation(&request, &ctx()).await;
    assert!(result.is_zero());
    assert_eq!(result.safety.guard(), Some(SafetyGuard::LowForecast));
}

#[tokio::test]
async fn test_recent_window_config() {
    let manager = manager().with_config(ManagerConfig::recent_window(Duration::minutes(20)));
    assert_eq!(manager.config().glucose_fetch_limit, RECENT_WINDOW_FETCH_LIMIT);

    let input = manager
        .prepare_calculation_input(&BolusRequest::new(Decimal::ZERO), &ctx())
        .await
        .unwrap();
    assert_eq!(input.delta_bg, dec!(6));
}

// =============================================================================
// Fail-safe
// =============================================================================

#[tokio::test]
async fn test_glucose_failure_gives_zero() {
    let manager = manager_with(
        Arc::new(UnavailableGlucose),
        Arc::new(InMemoryDeterminationStore::new(vec![fresh_determination()])),
    );
    let result = manager
        .handle_bolus_calculation(&BolusRequest::new(dec!(60)), &ctx())
        .await;

    assert!(result.is_zero());
    assert!(result.whole_calc.is_zero());
    assert_eq!(result.safety.guard(), Some(SafetyGuard::Unavailable));
}

#[tokio::test]
async fn test_determination_failure_gives_zero() {
    let manager = manager_with(
        Arc::new(InMemoryGlucoseStore::new(rising_glucose())),
        Arc::new(UnavailableDeterminations),
    );

    let err = manager
        .prepare_calculation_input(&BolusRequest::new(dec!(60)), &ctx())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FETCH");

    let result = manager
        .handle_bolus_calculation(&BolusRequest::new(dec!(60)), &ctx())
        .await;
    assert!(result.is_zero());
}
