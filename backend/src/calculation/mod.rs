// Incentive Calculation
//
// Turns an incentive config and a sales snapshot into a payout amount.
//
// Architecture:
// - template.rs: Built-in percentage and excess-over-threshold rules
// - limits.rs: Shared min/max clamp, floor and non-negativity
// - validation.rs: Pre-activation checks with itemized errors
// - catalog.rs: Configurable type listing for admin pickers
// - providers.rs: Async config and sales sources, in-memory stores
// - engine.rs: Calculation, simulation and batch orchestration

pub mod catalog;
pub mod engine;
pub mod limits;
pub mod providers;
pub mod template;
pub mod validation;

pub use catalog::{incentive_types, IncentiveTypeInfo};
pub use engine::{
    BatchReport, CalculationError, CalculationPlan, EmployeeOutcome, EngineError, EngineSettings,
    IncentiveEngine,
};
pub use limits::apply_limits;
pub use providers::{
    ConfigProvider, InMemoryConfigStore, InMemorySalesStore, ProviderError, SalesProvider,
};
pub use template::{calculate_template, SalesBasis, TemplateError, TemplateRule};
pub use validation::{
    check_parameters, validate_config, validate_config_with, validate_formula, ValidationError,
    ValidationReport, ValidationResult,
};
