//! Incentive configuration model
//!
//! One active configuration per employee, authored by an administrator and
//! owned by an external config store. The engine only reads it.
//!
//! # Invariants
//!
//! - Required parameters for `incentive_type` are present:
//!   `rate` for *_PERCENT, `threshold` + `rate` for *_EXCESS, a formula for CUSTOM
//! - `custom_formula` is present iff `incentive_type == CUSTOM`
//! - `rate ∈ [0, 1]`, `threshold >= 0`, `min_amount <= max_amount`
//!
//! These are checked by `calculation::validation`, not enforced on construction,
//! because configs arrive from outside (JSON, store rows) and must be reportable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Incentive Type
// ============================================================================

/// Calculation mode of an incentive configuration
///
/// `None` is not configurable; it labels results for employees without an
/// active plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncentiveType {
    /// `personalSales * rate`
    PersonalPercent,
    /// `totalSales * rate`
    TotalPercent,
    /// `max(0, personalSales - threshold) * rate`
    PersonalExcess,
    /// `max(0, totalSales - threshold) * rate`
    TotalExcess,
    /// Admin-authored formula evaluated by the sandboxed interpreter
    Custom,
    /// No incentive plan
    None,
}

impl IncentiveType {
    /// The five types an administrator may configure
    pub const CONFIGURABLE: [IncentiveType; 5] = [
        IncentiveType::PersonalPercent,
        IncentiveType::TotalPercent,
        IncentiveType::PersonalExcess,
        IncentiveType::TotalExcess,
        IncentiveType::Custom,
    ];

    /// Wire name (e.g. "PERSONAL_PERCENT")
    pub fn as_str(&self) -> &'static str {
        match self {
            IncentiveType::PersonalPercent => "PERSONAL_PERCENT",
            IncentiveType::TotalPercent => "TOTAL_PERCENT",
            IncentiveType::PersonalExcess => "PERSONAL_EXCESS",
            IncentiveType::TotalExcess => "TOTAL_EXCESS",
            IncentiveType::Custom => "CUSTOM",
            IncentiveType::None => "NONE",
        }
    }

    /// Names of the parameters this type requires
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            IncentiveType::PersonalPercent | IncentiveType::TotalPercent => &["rate"],
            IncentiveType::PersonalExcess | IncentiveType::TotalExcess => &["threshold", "rate"],
            IncentiveType::Custom => &["customFormula"],
            IncentiveType::None => &[],
        }
    }
}

impl fmt::Display for IncentiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Optional numeric parameters of a configuration
///
/// Every field is optional on the wire; which ones are required depends on
/// the configuration's type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveParameters {
    /// Commission rate in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Sales level above which the excess types pay commission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Guaranteed minimum payout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,

    /// Payout cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

impl IncentiveParameters {
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_min_amount(mut self, min_amount: f64) -> Self {
        self.min_amount = Some(min_amount);
        self
    }

    pub fn with_max_amount(mut self, max_amount: f64) -> Self {
        self.max_amount = Some(max_amount);
        self
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Per-employee incentive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveConfig {
    #[serde(rename = "type")]
    pub incentive_type: IncentiveType,

    #[serde(default)]
    pub parameters: IncentiveParameters,

    /// Formula text, CUSTOM only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_formula: Option<String>,

    #[serde(default)]
    pub is_active: bool,

    // Audit fields (owned by the config store)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
}

impl IncentiveConfig {
    /// Active template config with the given parameters
    pub fn template(incentive_type: IncentiveType, parameters: IncentiveParameters) -> Self {
        Self {
            incentive_type,
            parameters,
            custom_formula: None,
            is_active: true,
            effective_date: None,
            last_modified: None,
            modified_by: None,
        }
    }

    /// Active CUSTOM config evaluating `formula`
    pub fn custom(formula: impl Into<String>, parameters: IncentiveParameters) -> Self {
        Self {
            incentive_type: IncentiveType::Custom,
            parameters,
            custom_formula: Some(formula.into()),
            is_active: true,
            effective_date: None,
            last_modified: None,
            modified_by: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserializes_from_camel_case_json() {
        let json = r#"{
            "type": "PERSONAL_EXCESS",
            "parameters": { "rate": 0.1, "threshold": 5000000, "maxAmount": 2000000 },
            "isActive": true,
            "effectiveDate": "2024-01-01",
            "modifiedBy": "admin"
        }"#;
        let config: IncentiveConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.incentive_type, IncentiveType::PersonalExcess);
        assert_eq!(config.parameters.rate, Some(0.1));
        assert_eq!(config.parameters.threshold, Some(5_000_000.0));
        assert_eq!(config.parameters.max_amount, Some(2_000_000.0));
        assert_eq!(config.parameters.min_amount, None);
        assert!(config.is_active);
        assert_eq!(config.modified_by.as_deref(), Some("admin"));
    }

    #[test]
    fn test_incentive_type_wire_names() {
        for t in IncentiveType::CONFIGURABLE {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
        assert_eq!(serde_json::to_string(&IncentiveType::None).unwrap(), "\"NONE\"");
    }
}
