//! Incentive Calculation Engine
//!
//! Ties the formula DSL, templates, limits and validation together for three
//! call patterns:
//! - **calculate_incentive**: real calculation from provider data
//! - **simulate**: preview of a caller-supplied config (nothing persisted)
//! - **calculate_batch**: every employee of a payroll period, concurrently
//!
//! # Pipeline
//!
//! ```text
//! 1. Resolve config + sales snapshot (providers, awaited once)
//! 2. No active config → amount 0, type NONE
//! 3. Re-check parameters
//! 4. Template rule  ─or─  cached parse + sandboxed evaluation
//! 5. Reject non-finite raw values
//! 6. Apply limits (clamp, floor, >= 0)
//! ```
//!
//! # Failure Policy
//!
//! Real calculations fail closed: any error in steps 3-5 yields amount 0 with
//! the error recorded in `details.error`. Simulations return the error to the
//! caller instead. Provider failures are errors in both cases, and a batch
//! records them per employee without aborting the run.
//!
//! # Example
//!
//! ```rust
//! use incentive_engine_core_rs::calculation::{EngineSettings, IncentiveEngine};
//! use incentive_engine_core_rs::calculation::providers::{InMemoryConfigStore, InMemorySalesStore};
//! use incentive_engine_core_rs::models::{
//!     IncentiveConfig, IncentiveParameters, IncentiveType, SalesData,
//! };
//! use std::sync::Arc;
//!
//! let engine = IncentiveEngine::new(
//!     Arc::new(InMemoryConfigStore::new()),
//!     Arc::new(InMemorySalesStore::new()),
//!     EngineSettings::default(),
//! );
//!
//! let config = IncentiveConfig::template(
//!     IncentiveType::PersonalExcess,
//!     IncentiveParameters::default().with_threshold(5_000_000.0).with_rate(0.10),
//! );
//! let result = engine.simulate(&config, &SalesData::new(10_000_000.0, 0.0)).unwrap();
//! assert_eq!(result.amount, 500_000);
//! ```

use crate::calculation::limits::apply_limits;
use crate::calculation::providers::{ConfigProvider, ProviderError, SalesProvider};
use crate::calculation::template::{TemplateError, TemplateRule};
use crate::calculation::validation::{
    check_parameters, validate_config_with, ValidationError, ValidationReport,
};
use crate::formula::{
    evaluate, Bindings, EvalError, FormulaCache, ParseError, DEFAULT_CACHE_CAPACITY,
};
use crate::models::{
    CalculationDetails, CalculationResult, EmployeeProfile, IncentiveConfig, IncentiveParameters,
    IncentiveType, SalesData, YearMonth,
};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// Settings
// ============================================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Capacity of the process-wide formula cache (applied on first engine)
    pub formula_cache_capacity: usize,

    /// Employees calculated concurrently in a batch
    pub batch_concurrency: usize,

    /// Sales snapshot used to smoke-test formulas
    pub sample_sales: SalesData,

    /// Profile used to smoke-test formulas
    pub sample_profile: EmployeeProfile,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            formula_cache_capacity: DEFAULT_CACHE_CAPACITY,
            batch_concurrency: 8,
            sample_sales: SalesData::sample(),
            sample_profile: EmployeeProfile::sample(),
        }
    }
}

impl EngineSettings {
    /// Defaults overridden by environment variables
    ///
    /// - `INCENTIVE_FORMULA_CACHE_CAPACITY`
    /// - `INCENTIVE_BATCH_CONCURRENCY`
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Replace fields whose environment variable is set
    pub fn with_env_overrides(self) -> Self {
        Self {
            formula_cache_capacity: env_usize("INCENTIVE_FORMULA_CACHE_CAPACITY")
                .unwrap_or(self.formula_cache_capacity),
            batch_concurrency: env_usize("INCENTIVE_BATCH_CONCURRENCY")
                .unwrap_or(self.batch_concurrency),
            ..self
        }
    }

    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                component = "engine_settings",
                variable = name,
                value = %raw,
                "Ignoring unparseable setting"
            );
            None
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a single calculation could not produce an amount
#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Invalid parameters: {}", join_errors(.0))]
    InvalidParameters(Vec<ValidationError>),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Formula syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("Formula evaluation error: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Calculated amount is not a finite number ({0})")]
    NonFinite(f64),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculationError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Calculation Plan
// ============================================================================

/// A config resolved into what the engine will actually run
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationPlan<'a> {
    NoIncentive,
    Template(TemplateRule),
    Custom { formula: &'a str },
}

impl IncentiveConfig {
    /// Resolve this config into a typed plan
    pub fn plan(&self) -> Result<CalculationPlan<'_>, CalculationError> {
        match self.incentive_type {
            IncentiveType::None => Ok(CalculationPlan::NoIncentive),
            IncentiveType::Custom => match self.custom_formula.as_deref() {
                Some(formula) if !formula.trim().is_empty() => {
                    Ok(CalculationPlan::Custom { formula })
                }
                _ => Err(CalculationError::InvalidParameters(vec![
                    ValidationError::MissingFormula,
                ])),
            },
            template => Ok(CalculationPlan::Template(TemplateRule::from_parameters(
                template,
                &self.parameters,
            )?)),
        }
    }
}

// ============================================================================
// Batch Types
// ============================================================================

/// One employee's line in a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOutcome {
    pub user_id: String,

    /// Present unless the providers failed for this employee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmployeeOutcome {
    /// Needs admin review (provider failure or fail-closed calculation)
    pub fn needs_review(&self) -> bool {
        self.error.is_some()
            || self
                .result
                .as_ref()
                .is_some_and(CalculationResult::is_failed_closed)
    }
}

/// Per-employee results of one payroll period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub run_id: Uuid,
    pub period: YearMonth,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In the order the user ids were given
    pub outcomes: Vec<EmployeeOutcome>,
}

impl BatchReport {
    pub fn calculated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.needs_review()).count()
    }

    pub fn review_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.needs_review()).count()
    }

    pub fn outcome(&self, user_id: &str) -> Option<&EmployeeOutcome> {
        self.outcomes.iter().find(|o| o.user_id == user_id)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Incentive calculation service
///
/// Holds no per-calculation state; the formula cache is the only shared,
/// mutable component.
pub struct IncentiveEngine {
    configs: Arc<dyn ConfigProvider>,
    sales: Arc<dyn SalesProvider>,
    cache: Arc<FormulaCache>,
    settings: EngineSettings,
}

impl IncentiveEngine {
    /// Create an engine backed by the process-wide formula cache
    pub fn new(
        configs: Arc<dyn ConfigProvider>,
        sales: Arc<dyn SalesProvider>,
        settings: EngineSettings,
    ) -> Self {
        if !FormulaCache::init_global(settings.formula_cache_capacity) {
            debug!(
                component = "engine",
                event = "cache_reused",
                "Formula cache already initialized, keeping existing capacity"
            );
        }
        Self {
            configs,
            sales,
            cache: FormulaCache::global(),
            settings,
        }
    }

    /// Use a dedicated formula cache instead of the process-wide one
    pub fn with_cache(mut self, cache: Arc<FormulaCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cache(&self) -> &FormulaCache {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validate a config against the configured sample data
    pub fn validate(&self, config: &IncentiveConfig) -> ValidationReport {
        validate_config_with(
            config,
            &self.settings.sample_sales,
            &self.settings.sample_profile,
            &self.cache,
        )
    }

    /// Validate a bare formula (no limits), optionally on caller sample data
    pub fn validate_formula(
        &self,
        formula: &str,
        sample_sales: Option<&SalesData>,
    ) -> ValidationReport {
        let config = IncentiveConfig::custom(formula, IncentiveParameters::default());
        validate_config_with(
            &config,
            sample_sales.unwrap_or(&self.settings.sample_sales),
            &self.settings.sample_profile,
            &self.cache,
        )
    }

    // ------------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------------

    /// Preview a caller-supplied config (its `is_active` flag is ignored)
    pub fn simulate(
        &self,
        config: &IncentiveConfig,
        sales: &SalesData,
    ) -> Result<CalculationResult, EngineError> {
        self.simulate_with_profile(config, sales, &EmployeeProfile::default())
    }

    pub fn simulate_with_profile(
        &self,
        config: &IncentiveConfig,
        sales: &SalesData,
        profile: &EmployeeProfile,
    ) -> Result<CalculationResult, EngineError> {
        if config.incentive_type == IncentiveType::None {
            return Ok(CalculationResult::no_incentive());
        }
        let mut result = new_result(config, *sales, *profile);
        result.amount = self.compute(config, sales, profile, &mut result.details)?;
        Ok(result)
    }

    // ------------------------------------------------------------------------
    // Real Calculation
    // ------------------------------------------------------------------------

    /// Calculate one employee's incentive for a period
    ///
    /// Returns Err only when a provider fails. Evaluation problems fail
    /// closed inside the result.
    pub async fn calculate_incentive(
        &self,
        user_id: &str,
        period: YearMonth,
    ) -> Result<CalculationResult, EngineError> {
        let config = match self.configs.active_config(user_id).await? {
            Some(config) if config.is_active && config.incentive_type != IncentiveType::None => {
                config
            }
            _ => {
                debug!(component = "engine", event = "no_active_config", user_id, period = %period);
                return Ok(CalculationResult::no_incentive());
            }
        };

        let (sales, sales_assumed_zero) = match self.sales.sales_data(user_id, period).await? {
            Some(sales) => (sales, false),
            None => {
                debug!(component = "engine", event = "sales_missing", user_id, period = %period);
                (SalesData::default(), true)
            }
        };
        let profile = if config.incentive_type == IncentiveType::Custom {
            self.sales.employee_profile(user_id).await?
        } else {
            EmployeeProfile::default()
        };

        let mut result = new_result(&config, sales, profile);
        result.details.sales_assumed_zero = sales_assumed_zero;

        match self.compute(&config, &sales, &profile, &mut result.details) {
            Ok(amount) => {
                result.amount = amount;
                debug!(
                    component = "engine",
                    event = "calculated",
                    user_id,
                    period = %period,
                    incentive_type = %config.incentive_type,
                    amount
                );
            }
            Err(err) => {
                warn!(
                    component = "engine",
                    event = "failed_closed",
                    user_id,
                    period = %period,
                    incentive_type = %config.incentive_type,
                    error = %err,
                    "Calculation failed closed, amount set to 0"
                );
                result.amount = 0;
                result.details.error = Some(err.to_string());
            }
        }
        Ok(result)
    }

    /// Calculate every listed employee for a period
    ///
    /// Employees are independent: up to `batch_concurrency` run at once and a
    /// failure is recorded on that employee's line only.
    pub async fn calculate_batch(&self, user_ids: &[String], period: YearMonth) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            component = "engine",
            event = "batch_started",
            run_id = %run_id,
            period = %period,
            employees = user_ids.len()
        );

        let outcomes: Vec<EmployeeOutcome> = stream::iter(user_ids.iter().cloned())
            .map(|user_id| async move {
                match self.calculate_incentive(&user_id, period).await {
                    Ok(result) => EmployeeOutcome {
                        user_id,
                        result: Some(result),
                        error: None,
                    },
                    Err(err) => {
                        warn!(
                            component = "engine",
                            event = "employee_failed",
                            run_id = %run_id,
                            user_id = %user_id,
                            error = %err
                        );
                        EmployeeOutcome {
                            user_id,
                            result: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .buffered(self.settings.batch_concurrency.max(1))
            .collect()
            .await;

        let report = BatchReport {
            run_id,
            period,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            component = "engine",
            event = "batch_completed",
            run_id = %run_id,
            period = %period,
            calculated = report.calculated_count(),
            needs_review = report.review_count()
        );
        report
    }

    // ------------------------------------------------------------------------
    // Shared Pipeline
    // ------------------------------------------------------------------------

    /// Steps 3-6 of the pipeline; fills the routing fields of `details`
    fn compute(
        &self,
        config: &IncentiveConfig,
        sales: &SalesData,
        profile: &EmployeeProfile,
        details: &mut CalculationDetails,
    ) -> Result<i64, CalculationError> {
        check_parameters(config).map_err(CalculationError::InvalidParameters)?;

        let raw = match config.plan()? {
            CalculationPlan::NoIncentive => return Ok(0),
            CalculationPlan::Template(rule) => {
                details.template = Some(rule.incentive_type());
                rule.raw_amount(sales)
            }
            CalculationPlan::Custom { formula } => {
                details.formula = Some(formula.to_string());
                let ast = self.cache.get_or_parse(formula)?;
                evaluate(&ast, &Bindings::build(sales, profile))?
            }
        };

        details.raw_amount = Some(raw);
        if !raw.is_finite() {
            return Err(CalculationError::NonFinite(raw));
        }
        Ok(apply_limits(raw, &config.parameters))
    }
}

fn new_result(
    config: &IncentiveConfig,
    sales: SalesData,
    profile: EmployeeProfile,
) -> CalculationResult {
    CalculationResult {
        amount: 0,
        incentive_type: config.incentive_type,
        details: CalculationDetails {
            parameters: config.parameters,
            sales_data: Some(sales),
            profile: (config.incentive_type == IncentiveType::Custom).then_some(profile),
            ..CalculationDetails::default()
        },
        calculated_at: Utc::now(),
    }
}
