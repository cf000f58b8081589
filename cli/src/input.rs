//! JSON input files

use anyhow::{Context, Result};
use incentive_engine_core_rs::calculation::{InMemoryConfigStore, InMemorySalesStore};
use incentive_engine_core_rs::models::{EmployeeProfile, IncentiveConfig, SalesData, YearMonth};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Configs, sales and profiles for a batch run
///
/// ```json
/// {
///   "configs":  { "emp-1": { "type": "PERSONAL_PERCENT", "parameters": { "rate": 0.05 }, "isActive": true } },
///   "sales":    { "emp-1": { "2024-03": { "personal": 8000000, "total": 90000000 } } },
///   "profiles": { "emp-1": { "baseSalary": 3000000, "years": 4 } }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub configs: HashMap<String, IncentiveConfig>,
    pub sales: HashMap<String, HashMap<YearMonth, SalesData>>,
    pub profiles: HashMap<String, EmployeeProfile>,
}

impl Snapshot {
    pub async fn into_stores(self) -> (InMemoryConfigStore, InMemorySalesStore) {
        let configs = InMemoryConfigStore::from_map(self.configs);

        let sales = InMemorySalesStore::new();
        for (user_id, periods) in self.sales {
            for (period, data) in periods {
                sales.insert_sales(user_id.clone(), period, data).await;
            }
        }
        for (user_id, profile) in self.profiles {
            sales.insert_profile(user_id, profile).await;
        }

        (configs, sales)
    }
}
