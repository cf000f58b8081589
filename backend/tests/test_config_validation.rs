//! Config Validation Tests
//!
//! Itemized errors, range checks and the sample-data smoke test.

use incentive_engine_core_rs::calculation::{
    check_parameters, validate_config, validate_config_with, validate_formula, ValidationError,
};
use incentive_engine_core_rs::formula::{EvalError, FormulaCache};
use incentive_engine_core_rs::models::{
    EmployeeProfile, IncentiveConfig, IncentiveParameters, IncentiveType, SalesData,
};

fn template(incentive_type: IncentiveType, params: IncentiveParameters) -> IncentiveConfig {
    IncentiveConfig::template(incentive_type, params)
}

fn codes(config: &IncentiveConfig) -> Vec<&'static str> {
    validate_config(config, &SalesData::sample())
        .errors
        .iter()
        .map(ValidationError::code)
        .collect()
}

// ============================================================================
// Valid configs
// ============================================================================

#[test]
fn test_valid_template_reports_sample_result() {
    let config = template(
        IncentiveType::PersonalExcess,
        IncentiveParameters::default()
            .with_threshold(5_000_000.0)
            .with_rate(0.10),
    );
    let report = validate_config(&config, &SalesData::sample());
    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert_eq!(report.test_amount, Some(500_000));
}

#[test]
fn test_valid_custom_formula() {
    let config = IncentiveConfig::custom(
        "personalSales > 5000000 ? (personalSales - 5000000) * 0.15 : personalSales * 0.05",
        IncentiveParameters::default(),
    );
    let report = validate_config(&config, &SalesData::new(8_000_000.0, 0.0));
    assert!(report.is_valid);
    assert_eq!(report.test_amount, Some(450_000));
}

#[test]
fn test_rate_bounds_are_inclusive() {
    for rate in [0.0, 1.0] {
        let config = template(
            IncentiveType::TotalPercent,
            IncentiveParameters::default().with_rate(rate),
        );
        assert!(validate_config(&config, &SalesData::sample()).is_valid, "rate {}", rate);
    }
}

#[test]
fn test_equal_min_and_max_is_valid() {
    let config = template(
        IncentiveType::PersonalPercent,
        IncentiveParameters::default()
            .with_rate(0.1)
            .with_min_amount(100.0)
            .with_max_amount(100.0),
    );
    assert!(check_parameters(&config).is_ok());
}

// ============================================================================
// Parameter errors
// ============================================================================

#[test]
fn test_missing_required_parameters_are_itemized() {
    let config = template(IncentiveType::PersonalExcess, IncentiveParameters::default());
    let report = validate_config(&config, &SalesData::sample());
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            ValidationError::MissingParameter {
                incentive_type: IncentiveType::PersonalExcess,
                parameter: "threshold",
            },
            ValidationError::MissingParameter {
                incentive_type: IncentiveType::PersonalExcess,
                parameter: "rate",
            },
        ]
    );
    assert!(report.test_result.is_none());
    assert!(report.test_amount.is_none());
}

#[test]
fn test_all_range_errors_reported_together() {
    let config = template(
        IncentiveType::PersonalExcess,
        IncentiveParameters {
            rate: Some(1.5),
            threshold: Some(-1.0),
            min_amount: Some(-5.0),
            max_amount: Some(-10.0),
        },
    );
    assert_eq!(
        codes(&config),
        vec![
            "rate_out_of_range",
            "negative_threshold",
            "negative_min_amount",
            "negative_max_amount",
            "min_exceeds_max",
        ]
    );
}

#[test]
fn test_min_exceeding_max_is_invalid() {
    let config = template(
        IncentiveType::PersonalPercent,
        IncentiveParameters::default()
            .with_rate(0.1)
            .with_min_amount(2_000_000.0)
            .with_max_amount(1_000_000.0),
    );
    let errors = check_parameters(&config).unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::MinExceedsMax {
            min: 2_000_000.0,
            max: 1_000_000.0,
        }]
    );
}

#[test]
fn test_nan_rate_is_out_of_range() {
    let config = template(
        IncentiveType::PersonalPercent,
        IncentiveParameters::default().with_rate(f64::NAN),
    );
    assert_eq!(codes(&config), vec!["rate_out_of_range"]);
}

#[test]
fn test_negative_rate_is_out_of_range() {
    let config = template(
        IncentiveType::PersonalPercent,
        IncentiveParameters::default().with_rate(-0.01),
    );
    assert_eq!(codes(&config), vec!["rate_out_of_range"]);
}

#[test]
fn test_none_type_cannot_be_configured() {
    let config = template(IncentiveType::None, IncentiveParameters::default());
    assert_eq!(codes(&config), vec!["unconfigurable_type"]);
}

#[test]
fn test_template_with_formula_is_rejected() {
    let mut config = template(
        IncentiveType::PersonalPercent,
        IncentiveParameters::default().with_rate(0.1),
    );
    config.custom_formula = Some("personalSales * 0.1".to_string());
    assert_eq!(codes(&config), vec!["unexpected_formula"]);
}

// ============================================================================
// Custom formula errors
// ============================================================================

#[test]
fn test_custom_without_formula() {
    let mut config = IncentiveConfig::custom("   ", IncentiveParameters::default());
    assert_eq!(codes(&config), vec!["missing_formula"]);

    config.custom_formula = None;
    assert_eq!(codes(&config), vec!["missing_formula"]);
}

#[test]
fn test_syntax_error_carries_position() {
    let report = validate_formula("personalSales * * 2", None);
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code(), "syntax_error");
    assert_eq!(report.errors[0].position(), Some(16));
}

#[test]
fn test_infinite_sample_result_is_invalid() {
    let report = validate_formula("personalSales / 0", None);
    assert!(!report.is_valid);
    assert_eq!(report.errors, vec![ValidationError::NonFiniteResult(f64::INFINITY)]);
}

#[test]
fn test_nan_sample_result_is_invalid() {
    let report = validate_formula("personalSales / totalSales", Some(&SalesData::default()));
    assert!(!report.is_valid);
    assert_eq!(report.errors[0].code(), "non_finite_result");
}

#[test]
fn test_formula_and_range_errors_accumulate() {
    let config = IncentiveConfig::custom(
        "personalSales +",
        IncentiveParameters::default()
            .with_min_amount(10.0)
            .with_max_amount(5.0),
    );
    assert_eq!(codes(&config), vec!["min_exceeds_max", "syntax_error"]);
}

#[test]
fn test_profile_variables_use_sample_profile() {
    let cache = FormulaCache::new(4);
    let config = IncentiveConfig::custom(
        "baseSalary * 0.1 * performance",
        IncentiveParameters::default(),
    );

    let report = validate_config_with(
        &config,
        &SalesData::sample(),
        &EmployeeProfile::sample(),
        &cache,
    );
    assert!(report.is_valid);
    assert_eq!(report.test_amount, Some(300_000));

    // Same formula served from the cache the second time
    validate_config_with(&config, &SalesData::sample(), &EmployeeProfile::sample(), &cache);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_cached_syntax_errors_are_reported_every_time() {
    let cache = FormulaCache::new(4);
    let config = IncentiveConfig::custom("1 +", IncentiveParameters::default());
    for _ in 0..2 {
        let report = validate_config_with(
            &config,
            &SalesData::sample(),
            &EmployeeProfile::sample(),
            &cache,
        );
        assert!(!report.is_valid);
    }
    assert!(cache.is_empty());
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_report_serializes_with_codes() {
    let report = validate_formula("sales + foo", None);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["isValid"], false);
    assert_eq!(json["errors"][0]["code"], "syntax_error");
    assert_eq!(json["errors"][0]["position"], 8);
    assert!(json["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown identifier 'foo'"));
    assert!(json.get("testResult").is_none());
}

#[test]
fn test_evaluation_error_conversion() {
    let err: ValidationError = EvalError::UnboundVariable("years".to_string()).into();
    assert_eq!(err.code(), "evaluation_error");
    assert_eq!(err.position(), None);
}
