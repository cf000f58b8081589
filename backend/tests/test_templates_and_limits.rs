//! Template and Limit Tests
//!
//! The four built-in rules and the shared clamp/floor policy.

use incentive_engine_core_rs::calculation::{
    apply_limits, calculate_template, SalesBasis, TemplateError, TemplateRule,
};
use incentive_engine_core_rs::models::{IncentiveParameters, IncentiveType, SalesData};

fn params(rate: f64) -> IncentiveParameters {
    IncentiveParameters::default().with_rate(rate)
}

fn excess(threshold: f64, rate: f64) -> IncentiveParameters {
    IncentiveParameters::default()
        .with_threshold(threshold)
        .with_rate(rate)
}

/// Template raw amount followed by limits
fn amount(incentive_type: IncentiveType, params: &IncentiveParameters, sales: &SalesData) -> i64 {
    let raw = calculate_template(incentive_type, params, sales).unwrap();
    apply_limits(raw, params)
}

// ============================================================================
// Percent templates
// ============================================================================

#[test]
fn test_personal_percent() {
    let sales = SalesData::new(10_000_000.0, 100_000_000.0);
    assert_eq!(amount(IncentiveType::PersonalPercent, &params(0.05), &sales), 500_000);
}

#[test]
fn test_total_percent_reads_total_sales() {
    let sales = SalesData::new(10_000_000.0, 100_000_000.0);
    assert_eq!(amount(IncentiveType::TotalPercent, &params(0.01), &sales), 1_000_000);
}

#[test]
fn test_percent_fraction_is_floored() {
    let sales = SalesData::new(1_234_567.0, 0.0);
    // 1_234_567 * 0.03 = 37_037.01
    assert_eq!(amount(IncentiveType::PersonalPercent, &params(0.03), &sales), 37_037);
}

#[test]
fn test_zero_rate_pays_nothing() {
    let sales = SalesData::sample();
    assert_eq!(amount(IncentiveType::PersonalPercent, &params(0.0), &sales), 0);
}

#[test]
fn test_percent_capped_by_max_amount() {
    // raw 5_000_000 capped at 1_000_000
    let p = params(0.50).with_max_amount(1_000_000.0);
    let sales = SalesData::new(10_000_000.0, 0.0);
    assert_eq!(
        calculate_template(IncentiveType::PersonalPercent, &p, &sales).unwrap(),
        5_000_000.0
    );
    assert_eq!(amount(IncentiveType::PersonalPercent, &p, &sales), 1_000_000);
}

// ============================================================================
// Excess templates
// ============================================================================

#[test]
fn test_personal_excess() {
    let sales = SalesData::new(10_000_000.0, 0.0);
    assert_eq!(
        amount(IncentiveType::PersonalExcess, &excess(5_000_000.0, 0.10), &sales),
        500_000
    );
}

#[test]
fn test_excess_at_threshold_pays_nothing() {
    let sales = SalesData::new(5_000_000.0, 0.0);
    assert_eq!(
        amount(IncentiveType::PersonalExcess, &excess(5_000_000.0, 0.10), &sales),
        0
    );
}

#[test]
fn test_excess_below_threshold_pays_nothing() {
    let sales = SalesData::new(3_000_000.0, 0.0);
    assert_eq!(
        calculate_template(IncentiveType::PersonalExcess, &excess(5_000_000.0, 0.10), &sales)
            .unwrap(),
        0.0
    );
}

#[test]
fn test_total_excess_reads_total_sales() {
    let sales = SalesData::new(0.0, 120_000_000.0);
    assert_eq!(
        amount(IncentiveType::TotalExcess, &excess(100_000_000.0, 0.02), &sales),
        400_000
    );
}

#[test]
fn test_min_amount_guarantees_floor_payout() {
    let p = excess(5_000_000.0, 0.10).with_min_amount(50_000.0);
    let sales = SalesData::new(1_000_000.0, 0.0);
    assert_eq!(amount(IncentiveType::PersonalExcess, &p, &sales), 50_000);
}

// ============================================================================
// Rule resolution
// ============================================================================

#[test]
fn test_rule_from_parameters() {
    let rule =
        TemplateRule::from_parameters(IncentiveType::TotalExcess, &excess(1.0, 0.5)).unwrap();
    assert_eq!(
        rule,
        TemplateRule::Excess {
            basis: SalesBasis::Total,
            threshold: 1.0,
            rate: 0.5,
        }
    );
    assert_eq!(rule.incentive_type(), IncentiveType::TotalExcess);
}

#[test]
fn test_missing_rate_is_an_error() {
    let err = calculate_template(
        IncentiveType::PersonalPercent,
        &IncentiveParameters::default(),
        &SalesData::sample(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        TemplateError::MissingParameter {
            incentive_type: IncentiveType::PersonalPercent,
            parameter: "rate",
        }
    );
}

#[test]
fn test_missing_threshold_is_an_error() {
    let err = calculate_template(IncentiveType::TotalExcess, &params(0.1), &SalesData::sample())
        .unwrap_err();
    assert!(matches!(
        err,
        TemplateError::MissingParameter {
            parameter: "threshold",
            ..
        }
    ));
}

#[test]
fn test_custom_is_not_a_template() {
    let err = calculate_template(IncentiveType::Custom, &params(0.1), &SalesData::sample())
        .unwrap_err();
    assert_eq!(err, TemplateError::NotATemplate(IncentiveType::Custom));
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_limits_without_bounds_floor_and_clamp_at_zero() {
    let none = IncentiveParameters::default();
    assert_eq!(apply_limits(12_345.9, &none), 12_345);
    assert_eq!(apply_limits(-12_345.9, &none), 0);
    assert_eq!(apply_limits(0.0, &none), 0);
}

#[test]
fn test_limits_apply_min_then_max() {
    let bounded = IncentiveParameters::default()
        .with_min_amount(100_000.0)
        .with_max_amount(200_000.0);
    assert_eq!(apply_limits(50_000.0, &bounded), 100_000);
    assert_eq!(apply_limits(150_000.5, &bounded), 150_000);
    assert_eq!(apply_limits(500_000.0, &bounded), 200_000);
}

#[test]
fn test_negative_raw_with_min_amount_pays_min() {
    let p = IncentiveParameters::default().with_min_amount(10_000.0);
    assert_eq!(apply_limits(-1_000_000.0, &p), 10_000);
}
