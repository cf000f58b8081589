//! Calculation result model
//!
//! Ephemeral: returned to the caller (payroll aggregation, UI preview) and
//! never stored by the engine.

use crate::models::config::{IncentiveParameters, IncentiveType};
use crate::models::sales::{EmployeeProfile, SalesData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit trail attached to every result
///
/// Exactly one of `template` / `formula` is set for a computed result; both
/// are empty on the no-plan path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<IncentiveType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    #[serde(default)]
    pub parameters: IncentiveParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_data: Option<SalesData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<EmployeeProfile>,

    /// Value before limits were applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_amount: Option<f64>,

    /// Set when no sales snapshot existed and zero sales were assumed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sales_assumed_zero: bool,

    /// Set when the calculation failed closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Incentive amount for one employee (or one simulation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Final payout, always >= 0
    pub amount: i64,

    #[serde(rename = "type")]
    pub incentive_type: IncentiveType,

    pub details: CalculationDetails,

    pub calculated_at: DateTime<Utc>,
}

impl CalculationResult {
    /// Result for an employee without an active plan
    pub fn no_incentive() -> Self {
        Self {
            amount: 0,
            incentive_type: IncentiveType::None,
            details: CalculationDetails::default(),
            calculated_at: Utc::now(),
        }
    }

    /// True if the calculation failed closed and needs admin review
    pub fn is_failed_closed(&self) -> bool {
        self.details.error.is_some()
    }
}
