//! Built-in incentive templates
//!
//! | type             | raw amount                                 |
//! |------------------|--------------------------------------------|
//! | PERSONAL_PERCENT | `personalSales * rate`                     |
//! | TOTAL_PERCENT    | `totalSales * rate`                        |
//! | PERSONAL_EXCESS  | `max(0, personalSales - threshold) * rate` |
//! | TOTAL_EXCESS     | `max(0, totalSales - threshold) * rate`    |
//!
//! The raw amount still goes through `limits::apply_limits`.

use crate::models::{IncentiveParameters, IncentiveType, SalesData};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("{incentive_type} requires parameter '{parameter}'")]
    MissingParameter {
        incentive_type: IncentiveType,
        parameter: &'static str,
    },

    #[error("{0} is not a template type")]
    NotATemplate(IncentiveType),
}

/// Which sales figure a template reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesBasis {
    Personal,
    Total,
}

impl SalesBasis {
    pub fn select(&self, sales: &SalesData) -> f64 {
        match self {
            SalesBasis::Personal => sales.personal,
            SalesBasis::Total => sales.total,
        }
    }
}

/// A template with every required parameter present
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateRule {
    Percent { basis: SalesBasis, rate: f64 },
    Excess { basis: SalesBasis, threshold: f64, rate: f64 },
}

impl TemplateRule {
    /// Resolve a template type and its optional parameters
    pub fn from_parameters(
        incentive_type: IncentiveType,
        params: &IncentiveParameters,
    ) -> Result<Self, TemplateError> {
        let require = |value: Option<f64>, parameter: &'static str| {
            value.ok_or(TemplateError::MissingParameter {
                incentive_type,
                parameter,
            })
        };

        match incentive_type {
            IncentiveType::PersonalPercent => Ok(TemplateRule::Percent {
                basis: SalesBasis::Personal,
                rate: require(params.rate, "rate")?,
            }),
            IncentiveType::TotalPercent => Ok(TemplateRule::Percent {
                basis: SalesBasis::Total,
                rate: require(params.rate, "rate")?,
            }),
            IncentiveType::PersonalExcess => Ok(TemplateRule::Excess {
                basis: SalesBasis::Personal,
                threshold: require(params.threshold, "threshold")?,
                rate: require(params.rate, "rate")?,
            }),
            IncentiveType::TotalExcess => Ok(TemplateRule::Excess {
                basis: SalesBasis::Total,
                threshold: require(params.threshold, "threshold")?,
                rate: require(params.rate, "rate")?,
            }),
            other => Err(TemplateError::NotATemplate(other)),
        }
    }

    pub fn incentive_type(&self) -> IncentiveType {
        match self {
            TemplateRule::Percent {
                basis: SalesBasis::Personal,
                ..
            } => IncentiveType::PersonalPercent,
            TemplateRule::Percent {
                basis: SalesBasis::Total,
                ..
            } => IncentiveType::TotalPercent,
            TemplateRule::Excess {
                basis: SalesBasis::Personal,
                ..
            } => IncentiveType::PersonalExcess,
            TemplateRule::Excess {
                basis: SalesBasis::Total,
                ..
            } => IncentiveType::TotalExcess,
        }
    }

    /// Raw (unlimited, unrounded) amount
    pub fn raw_amount(&self, sales: &SalesData) -> f64 {
        match self {
            TemplateRule::Percent { basis, rate } => basis.select(sales) * rate,
            TemplateRule::Excess {
                basis,
                threshold,
                rate,
            } => (basis.select(sales) - threshold).max(0.0) * rate,
        }
    }
}

/// Compute the raw template amount for a type, parameters and sales snapshot
pub fn calculate_template(
    incentive_type: IncentiveType,
    params: &IncentiveParameters,
    sales: &SalesData,
) -> Result<f64, TemplateError> {
    Ok(TemplateRule::from_parameters(incentive_type, params)?.raw_amount(sales))
}
