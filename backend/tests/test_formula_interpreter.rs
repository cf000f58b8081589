//! Formula Interpreter Tests
//!
//! Numeric semantics of the DSL: operators, comparisons, ternary selection,
//! the Math calls and IEEE-754 edge cases.

use incentive_engine_core_rs::formula::{
    evaluate, parse_formula, Bindings, EvalError, Expr, FormulaCache,
};
use incentive_engine_core_rs::models::{EmployeeProfile, SalesData};

/// Helper to parse and evaluate against a sales snapshot
fn eval_with(formula: &str, sales: SalesData) -> f64 {
    let ast = parse_formula(formula).unwrap();
    evaluate(&ast, &Bindings::from_sales(&sales)).unwrap()
}

fn eval(formula: &str) -> f64 {
    eval_with(formula, SalesData::sample())
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_basic_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), 7.0);
    assert_eq!(eval("(1 + 2) * 3"), 9.0);
    assert_eq!(eval("10 / 4"), 2.5);
    assert_eq!(eval("10 - 4 - 3"), 3.0);
    assert_eq!(eval("-5 + 2"), -3.0);
}

#[test]
fn test_remainder_keeps_dividend_sign() {
    assert_eq!(eval("7 % 3"), 1.0);
    assert_eq!(eval("-7 % 3"), -1.0);
    assert_eq!(eval("7.5 % 2"), 1.5);
}

#[test]
fn test_variables_come_from_sales_snapshot() {
    let sales = SalesData::new(8_000_000.0, 50_000_000.0).with_team(20_000_000.0);
    assert_eq!(eval_with("personalSales", sales), 8_000_000.0);
    assert_eq!(eval_with("sales", sales), 8_000_000.0);
    assert_eq!(eval_with("totalSales", sales), 50_000_000.0);
    assert_eq!(eval_with("teamSales", sales), 20_000_000.0);
}

#[test]
fn test_missing_team_sales_is_zero() {
    assert_eq!(eval_with("teamSales + 1", SalesData::new(1.0, 2.0)), 1.0);
}

#[test]
fn test_profile_variables() {
    let profile = EmployeeProfile {
        base_salary: Some(3_000_000.0),
        years: Some(4.0),
        performance: Some(1.2),
    };
    let ast = parse_formula("baseSalary * 0.01 * years * performance").unwrap();
    let value = evaluate(&ast, &Bindings::build(&SalesData::default(), &profile)).unwrap();
    assert!((value - 144_000.0).abs() < 1e-6);
}

// ============================================================================
// Comparisons and ternary
// ============================================================================

#[test]
fn test_comparisons_yield_one_or_zero() {
    assert_eq!(eval("2 > 1"), 1.0);
    assert_eq!(eval("2 < 1"), 0.0);
    assert_eq!(eval("2 >= 2"), 1.0);
    assert_eq!(eval("2 <= 1"), 0.0);
    assert_eq!(eval("2 == 2"), 1.0);
    assert_eq!(eval("2 != 2"), 0.0);
}

#[test]
fn test_equality_is_exact() {
    assert_eq!(eval("0.1 + 0.2 == 0.3"), 0.0);
}

#[test]
fn test_comparison_result_is_numeric() {
    // Comparisons can be used as 0/1 factors
    let value = eval_with("(personalSales > 5000000) * 1000", SalesData::new(8_000_000.0, 0.0));
    assert_eq!(value, 1000.0);
}

#[test]
fn test_tiered_ternary() {
    let formula = "personalSales > 5000000 ? (personalSales - 5000000) * 0.15 : personalSales * 0.05";
    assert_eq!(
        eval_with(formula, SalesData::new(8_000_000.0, 0.0)),
        450_000.0
    );
    assert_eq!(
        eval_with(formula, SalesData::new(4_000_000.0, 0.0)),
        200_000.0
    );
}

#[test]
fn test_nan_condition_selects_else_branch() {
    assert_eq!(eval("(0 / 0) ? 1 : 2"), 2.0);
    assert_eq!(eval("0 ? 1 : 2"), 2.0);
    assert_eq!(eval("-3 ? 1 : 2"), 1.0);
}

#[test]
fn test_ternary_evaluates_only_selected_branch() {
    // An unbound variable in the dead branch is never looked up
    let ast = parse_formula("1 ? 5 : baseSalary").unwrap();
    let mut bindings = Bindings::new();
    bindings.set("sales", 0.0).unwrap();
    assert_eq!(evaluate(&ast, &bindings).unwrap(), 5.0);
}

// ============================================================================
// Math calls
// ============================================================================

#[test]
fn test_math_max_and_min() {
    assert_eq!(eval("Math.max(3, 7)"), 7.0);
    assert_eq!(eval("Math.min(3, 7)"), 3.0);
    assert_eq!(
        eval_with("Math.max(0, personalSales - 5000000)", SalesData::new(4_000_000.0, 0.0)),
        0.0
    );
}

#[test]
fn test_math_max_propagates_nan() {
    assert!(eval("Math.max(1, 0 / 0)").is_nan());
    assert!(eval("Math.min(0 / 0, 1)").is_nan());
}

#[test]
fn test_math_round_halves_toward_positive_infinity() {
    assert_eq!(eval("Math.round(2.5)"), 3.0);
    assert_eq!(eval("Math.round(2.4)"), 2.0);
    assert_eq!(eval("Math.round(-2.5)"), -2.0);
    assert_eq!(eval("Math.round(-2.6)"), -3.0);
}

// ============================================================================
// IEEE-754 edge cases
// ============================================================================

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("1 / 0"), f64::INFINITY);
    assert_eq!(eval("-1 / 0"), f64::NEG_INFINITY);
    assert!(eval("0 / 0").is_nan());
    assert!(eval("5 % 0").is_nan());
}

#[test]
fn test_zero_sales_division_is_not_an_error() {
    let value = eval_with("personalSales / totalSales", SalesData::default());
    assert!(value.is_nan());
}

// ============================================================================
// Hand-built trees
// ============================================================================

#[test]
fn test_hand_built_variable_outside_allow_list() {
    let ast = Expr::variable("constructor");
    assert_eq!(
        evaluate(&ast, &Bindings::from_sales(&SalesData::sample())),
        Err(EvalError::VariableNotAllowed("constructor".to_string()))
    );
}

#[test]
fn test_hand_built_disallowed_call() {
    let ast = Expr::Call {
        name: "eval".to_string(),
        args: vec![Expr::literal(1.0)],
    };
    assert_eq!(
        evaluate(&ast, &Bindings::new()),
        Err(EvalError::DisallowedCall("eval".to_string()))
    );
}

#[test]
fn test_unbound_variable() {
    let ast = parse_formula("years + 1").unwrap();
    assert_eq!(
        evaluate(&ast, &Bindings::new()),
        Err(EvalError::UnboundVariable("years".to_string()))
    );
}

#[test]
fn test_cached_ast_evaluates_like_fresh_parse() {
    let cache = FormulaCache::new(8);
    let formula = "Math.min(personalSales * 0.1, 750000)";
    let cached = cache.get_or_parse(formula).unwrap();
    let again = cache.get_or_parse(formula).unwrap();

    let bindings = Bindings::from_sales(&SalesData::sample());
    assert_eq!(evaluate(&cached, &bindings), evaluate(&again, &bindings));
    assert_eq!(evaluate(&cached, &bindings).unwrap(), 750_000.0);
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}
