//! Incentive Engine Core - Rust Engine
//!
//! Computes monthly sales incentives for payroll from per-employee configs.
//!
//! # Architecture
//!
//! - **models**: Domain types (IncentiveConfig, SalesData, CalculationResult)
//! - **formula**: Sandboxed formula DSL (parser, evaluator, AST cache)
//! - **calculation**: Templates, limits, validation and the engine
//!
//! # Critical Invariants
//!
//! 1. All payout amounts are i64 (whole currency units), floored and >= 0
//! 2. Custom formulas are never executed as host code
//! 3. Real calculations fail closed: any error pays 0 and is recorded

// Module declarations
pub mod calculation;
pub mod formula;
pub mod models;

// Re-exports for convenience
pub use calculation::{
    apply_limits, calculate_template, incentive_types, validate_config, validate_formula,
    BatchReport, CalculationError, EngineError, EngineSettings, IncentiveEngine, ValidationError,
    ValidationReport,
};
pub use formula::{evaluate, parse_formula, Bindings, EvalError, FormulaCache, ParseError};
pub use models::{
    CalculationDetails, CalculationResult, EmployeeProfile, IncentiveConfig, IncentiveParameters,
    IncentiveType, SalesData, YearMonth,
};
