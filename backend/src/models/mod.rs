//! Domain models
//!
//! - **config**: Incentive configuration (type, parameters, custom formula)
//! - **sales**: Calculation inputs (sales snapshot, employee profile, period)
//! - **result**: Calculation results and their audit details
//!
//! CRITICAL: All payout amounts are i64 (whole currency units)

pub mod config;
pub mod result;
pub mod sales;

pub use config::{IncentiveConfig, IncentiveParameters, IncentiveType};
pub use result::{CalculationDetails, CalculationResult};
pub use sales::{EmployeeProfile, PeriodError, SalesData, YearMonth};
