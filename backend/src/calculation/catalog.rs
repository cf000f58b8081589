//! Static catalog of configurable incentive types (for admin UI pickers)

use crate::models::IncentiveType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTypeInfo {
    pub value: IncentiveType,
    pub name: &'static str,
    pub description: &'static str,
    pub required_params: &'static [&'static str],
}

/// The five configurable types, in display order
pub fn incentive_types() -> Vec<IncentiveTypeInfo> {
    IncentiveType::CONFIGURABLE
        .iter()
        .map(|&value| {
            let (name, description) = match value {
                IncentiveType::PersonalPercent => (
                    "Personal sales percentage",
                    "A fixed rate of the employee's own sales",
                ),
                IncentiveType::TotalPercent => (
                    "Total sales percentage",
                    "A fixed rate of total company sales",
                ),
                IncentiveType::PersonalExcess => (
                    "Personal sales over threshold",
                    "A fixed rate of the employee's sales above a threshold",
                ),
                IncentiveType::TotalExcess => (
                    "Total sales over threshold",
                    "A fixed rate of total company sales above a threshold",
                ),
                IncentiveType::Custom => (
                    "Custom formula",
                    "An administrator-defined formula over sales and profile variables",
                ),
                IncentiveType::None => ("No incentive", "No incentive plan"),
            };
            IncentiveTypeInfo {
                value,
                name,
                description,
                required_params: value.required_params(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_five_configurable_types() {
        let types = incentive_types();
        assert_eq!(types.len(), 5);
        assert!(types.iter().all(|t| t.value != IncentiveType::None));
    }

    #[test]
    fn test_catalog_required_params() {
        let types = incentive_types();
        let excess = types
            .iter()
            .find(|t| t.value == IncentiveType::TotalExcess)
            .unwrap();
        assert_eq!(excess.required_params, &["threshold", "rate"]);

        let json = serde_json::to_value(&types[0]).unwrap();
        assert_eq!(json["value"], "PERSONAL_PERCENT");
        assert_eq!(json["requiredParams"][0], "rate");
    }
}
