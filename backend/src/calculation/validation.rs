// Incentive Config Validation
//
// Pre-activation checks for an incentive configuration:
// - Required parameters for the type are present
// - Numeric ranges (rate, threshold, min/max amounts)
// - Custom formula syntax
// - Custom formula smoke test against representative sample data
//
// Every check runs and all errors are returned together, so an administrator
// can fix everything in one pass.

use crate::calculation::limits::apply_limits;
use crate::calculation::template::TemplateRule;
use crate::formula::{evaluate, Bindings, EvalError, FormulaCache, ParseError};
use crate::models::{
    EmployeeProfile, IncentiveConfig, IncentiveParameters, IncentiveType, SalesData,
};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} cannot be configured; deactivate the config instead")]
    UnconfigurableType(IncentiveType),

    #[error("{incentive_type} requires parameter '{parameter}'")]
    MissingParameter {
        incentive_type: IncentiveType,
        parameter: &'static str,
    },

    #[error("CUSTOM requires a non-empty customFormula")]
    MissingFormula,

    #[error("customFormula is only allowed for CUSTOM, not {0}")]
    UnexpectedFormula(IncentiveType),

    #[error("rate {0} must be between 0 and 1")]
    RateOutOfRange(f64),

    #[error("threshold {0} must be >= 0")]
    NegativeThreshold(f64),

    #[error("minAmount {0} must be >= 0")]
    NegativeMinAmount(f64),

    #[error("maxAmount {0} must be >= 0")]
    NegativeMaxAmount(f64),

    #[error("minAmount {min} exceeds maxAmount {max}")]
    MinExceedsMax { min: f64, max: f64 },

    #[error("Formula syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("Formula evaluation failed on sample data: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Formula result on sample data is not a finite number ({0})")]
    NonFiniteResult(f64),
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::UnconfigurableType(_) => "unconfigurable_type",
            ValidationError::MissingParameter { .. } => "missing_parameter",
            ValidationError::MissingFormula => "missing_formula",
            ValidationError::UnexpectedFormula(_) => "unexpected_formula",
            ValidationError::RateOutOfRange(_) => "rate_out_of_range",
            ValidationError::NegativeThreshold(_) => "negative_threshold",
            ValidationError::NegativeMinAmount(_) => "negative_min_amount",
            ValidationError::NegativeMaxAmount(_) => "negative_max_amount",
            ValidationError::MinExceedsMax { .. } => "min_exceeds_max",
            ValidationError::Syntax(_) => "syntax_error",
            ValidationError::Evaluation(_) => "evaluation_error",
            ValidationError::NonFiniteResult(_) => "non_finite_result",
        }
    }

    /// Character position for syntax errors
    pub fn position(&self) -> Option<usize> {
        match self {
            ValidationError::Syntax(err) => Some(err.position),
            _ => None,
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let position = self.position();
        let mut state =
            serializer.serialize_struct("ValidationError", if position.is_some() { 3 } else { 2 })?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        if let Some(position) = position {
            state.serialize_field("position", &position)?;
        }
        state.end()
    }
}

/// Validation result of a single check group
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Verdict on a configuration
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,

    pub errors: Vec<ValidationError>,

    /// Raw value on the sample data, when the smoke test ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_result: Option<f64>,

    /// `test_result` after limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_amount: Option<i64>,
}

/// Validate a configuration using the process-wide formula cache
///
/// # Example
///
/// ```rust
/// use incentive_engine_core_rs::calculation::validate_config;
/// use incentive_engine_core_rs::models::{IncentiveConfig, IncentiveParameters, SalesData};
///
/// let config = IncentiveConfig::custom("personalSales * 0.05", IncentiveParameters::default());
/// let report = validate_config(&config, &SalesData::sample());
/// assert!(report.is_valid);
/// assert_eq!(report.test_amount, Some(500_000));
/// ```
pub fn validate_config(config: &IncentiveConfig, sample_sales: &SalesData) -> ValidationReport {
    validate_config_with(
        config,
        sample_sales,
        &EmployeeProfile::sample(),
        &FormulaCache::global(),
    )
}

/// Validate a configuration with explicit sample inputs and cache
pub fn validate_config_with(
    config: &IncentiveConfig,
    sample_sales: &SalesData,
    sample_profile: &EmployeeProfile,
    cache: &FormulaCache,
) -> ValidationReport {
    let mut errors = Vec::new();

    if let Err(e) = validate_required_parameters(config) {
        errors.extend(e);
    }

    if let Err(e) = validate_parameter_ranges(&config.parameters) {
        errors.extend(e);
    }

    let test_result = match smoke_test(config, sample_sales, sample_profile, cache) {
        Ok(raw) => raw,
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let test_amount = match test_result {
        Some(raw) if errors.is_empty() => Some(apply_limits(raw, &config.parameters)),
        _ => None,
    };

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        test_result,
        test_amount,
    }
}

/// Validate a bare formula as a CUSTOM config without limits
///
/// `sample_sales` defaults to `SalesData::sample()`.
pub fn validate_formula(formula: &str, sample_sales: Option<&SalesData>) -> ValidationReport {
    let config = IncentiveConfig::custom(formula, IncentiveParameters::default());
    let sample = sample_sales.copied().unwrap_or_else(SalesData::sample);
    validate_config(&config, &sample)
}

/// Structural and range checks only (no formula parsing)
///
/// Run again at calculation time so a stored config that slipped past
/// validation fails closed instead of paying out.
pub fn check_parameters(config: &IncentiveConfig) -> ValidationResult {
    let mut errors = Vec::new();
    if let Err(e) = validate_required_parameters(config) {
        errors.extend(e);
    }
    if let Err(e) = validate_parameter_ranges(&config.parameters) {
        errors.extend(e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// Required Parameters
// ============================================================================

fn validate_required_parameters(config: &IncentiveConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let formula = config
        .custom_formula
        .as_deref()
        .filter(|f| !f.trim().is_empty());

    match config.incentive_type {
        IncentiveType::None => {
            errors.push(ValidationError::UnconfigurableType(IncentiveType::None))
        }
        IncentiveType::Custom => {
            if formula.is_none() {
                errors.push(ValidationError::MissingFormula);
            }
        }
        template => {
            let params = &config.parameters;
            for &parameter in template.required_params() {
                let present = match parameter {
                    "rate" => params.rate.is_some(),
                    "threshold" => params.threshold.is_some(),
                    _ => true,
                };
                if !present {
                    errors.push(ValidationError::MissingParameter {
                        incentive_type: template,
                        parameter,
                    });
                }
            }
            if formula.is_some() {
                errors.push(ValidationError::UnexpectedFormula(template));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// Numeric Ranges
// ============================================================================

fn validate_parameter_ranges(params: &IncentiveParameters) -> ValidationResult {
    let mut errors = Vec::new();

    // Negated comparisons so NaN fails every check
    if let Some(rate) = params.rate {
        if !(0.0..=1.0).contains(&rate) {
            errors.push(ValidationError::RateOutOfRange(rate));
        }
    }
    if let Some(threshold) = params.threshold {
        if !(threshold >= 0.0) {
            errors.push(ValidationError::NegativeThreshold(threshold));
        }
    }
    if let Some(min) = params.min_amount {
        if !(min >= 0.0) {
            errors.push(ValidationError::NegativeMinAmount(min));
        }
    }
    if let Some(max) = params.max_amount {
        if !(max >= 0.0) {
            errors.push(ValidationError::NegativeMaxAmount(max));
        }
    }
    if let (Some(min), Some(max)) = (params.min_amount, params.max_amount) {
        if min > max {
            errors.push(ValidationError::MinExceedsMax { min, max });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// Smoke Test
// ============================================================================

/// Compute the raw amount on sample data
///
/// Ok(None) when the config is too incomplete to run (already reported by
/// the parameter checks).
fn smoke_test(
    config: &IncentiveConfig,
    sample_sales: &SalesData,
    sample_profile: &EmployeeProfile,
    cache: &FormulaCache,
) -> Result<Option<f64>, ValidationError> {
    match config.incentive_type {
        IncentiveType::None => Ok(None),
        IncentiveType::Custom => {
            let formula = match config.custom_formula.as_deref() {
                Some(f) if !f.trim().is_empty() => f,
                _ => return Ok(None),
            };
            let ast = cache.get_or_parse(formula)?;
            let raw = evaluate(&ast, &Bindings::build(sample_sales, sample_profile))?;
            if !raw.is_finite() {
                return Err(ValidationError::NonFiniteResult(raw));
            }
            Ok(Some(raw))
        }
        template => Ok(TemplateRule::from_parameters(template, &config.parameters)
            .ok()
            .map(|rule| rule.raw_amount(sample_sales))),
    }
}
