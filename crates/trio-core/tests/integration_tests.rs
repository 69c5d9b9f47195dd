//! Wire-format and tracing checks for the shared data model.

use rust_decimal_macros::dec;
use trio_core::telemetry::try_init_tracing_with_filter;
use trio_core::{BolusRequest, CalculationInput, CalculationResult, Clamp, SafetyVerdict};

#[test]
fn test_tracing_init_is_idempotent() {
    try_init_tracing_with_filter("trio=debug");
    assert!(!try_init_tracing_with_filter("trio=debug"));
}

#[test]
fn test_input_decodes_app_field_names() {
    let json = r#"{
        "carbs": 45,
        "currentBG": 162,
        "deltaBG": -4,
        "target": 100,
        "isf": 45,
        "carbRatio": 9,
        "iob": 1.25,
        "cob": 12,
        "useFattyMealCorrectionFactor": false,
        "fattyMealFactor": 0.7,
        "useSuperBolus": true,
        "sweetMealFactor": 1,
        "basal": 0.85,
        "fraction": 0.8,
        "maxBolus": 10,
        "maxIOB": 6,
        "maxCOB": 120,
        "minPredBG": 88,
        "lastLoopDate": "2024-06-01T11:58:00Z"
    }"#;

    let input: CalculationInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.current_bg, dec!(162));
    assert_eq!(input.delta_bg, dec!(-4));
    assert_eq!(input.max_iob, dec!(6));
    assert_eq!(input.min_pred_bg, dec!(88));
    assert!(input.use_super_bolus);
}

#[test]
fn test_result_carries_verdict() {
    let mut result = CalculationResult::zero();
    result.insulin_calculated = dec!(2.5);
    let mut safety = SafetyVerdict::allowed();
    safety.clamp(Clamp::MaxBolus);
    result.safety = safety;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["safety"]["type"], "ALLOWED");
    assert_eq!(json["safety"]["clamps"][0], "MAX_BOLUS");
    assert!(json.get("wholeCobInsulin").is_some());
}

#[test]
fn test_remote_meal_command_decodes() {
    let request: BolusRequest =
        serde_json::from_str(r#"{"carbs": 30, "useFattyMealCorrection": true, "useSuperBolus": false}"#).unwrap();
    assert!(request.use_fatty_meal_correction);
    assert_eq!(request.last_loop_date, None);
    assert_eq!(request.min_pred_bg, None);
}
