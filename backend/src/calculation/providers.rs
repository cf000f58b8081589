//! External data providers
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │    ConfigProvider    │     │    SalesProvider     │
//! │  (active config per  │     │ (snapshot per user + │
//! │        user)         │     │  period, profile)    │
//! └──────────┬───────────┘     └──────────┬───────────┘
//!            └─────────────┬──────────────┘
//!                          ▼
//!                  IncentiveEngine
//! ```
//!
//! Real deployments back these with the config store and the sales system.
//! The in-memory stores serve tests, the CLI and previews.

use crate::models::{EmployeeProfile, IncentiveConfig, SalesData, YearMonth};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider returned invalid data for user {user_id}: {reason}")]
    InvalidData { user_id: String, reason: String },
}

/// Source of per-user incentive configurations
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// The user's effective config, or None when no plan exists
    async fn active_config(&self, user_id: &str) -> Result<Option<IncentiveConfig>, ProviderError>;
}

/// Source of sales snapshots and employee profiles
#[async_trait]
pub trait SalesProvider: Send + Sync {
    async fn sales_data(
        &self,
        user_id: &str,
        period: YearMonth,
    ) -> Result<Option<SalesData>, ProviderError>;

    /// Profile variables for custom formulas; empty by default
    async fn employee_profile(&self, _user_id: &str) -> Result<EmployeeProfile, ProviderError> {
        Ok(EmployeeProfile::default())
    }
}

// ============================================================================
// In-Memory Config Store
// ============================================================================

/// Config store held in memory
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: RwLock<HashMap<String, IncentiveConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(configs: HashMap<String, IncentiveConfig>) -> Self {
        Self {
            configs: RwLock::new(configs),
        }
    }

    /// Insert or replace a user's config (no validation)
    pub async fn insert(&self, user_id: impl Into<String>, config: IncentiveConfig) {
        self.configs.write().await.insert(user_id.into(), config);
    }

    pub async fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.configs.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ConfigProvider for InMemoryConfigStore {
    async fn active_config(&self, user_id: &str) -> Result<Option<IncentiveConfig>, ProviderError> {
        Ok(self
            .configs
            .read()
            .await
            .get(user_id)
            .filter(|config| config.is_active)
            .cloned())
    }
}

// ============================================================================
// In-Memory Sales Store
// ============================================================================

/// Sales snapshots and profiles held in memory
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    sales: RwLock<HashMap<(String, YearMonth), SalesData>>,
    profiles: RwLock<HashMap<String, EmployeeProfile>>,
}

impl InMemorySalesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_sales(
        &self,
        user_id: impl Into<String>,
        period: YearMonth,
        sales: SalesData,
    ) {
        self.sales.write().await.insert((user_id.into(), period), sales);
    }

    pub async fn insert_profile(&self, user_id: impl Into<String>, profile: EmployeeProfile) {
        self.profiles.write().await.insert(user_id.into(), profile);
    }
}

#[async_trait]
impl SalesProvider for InMemorySalesStore {
    async fn sales_data(
        &self,
        user_id: &str,
        period: YearMonth,
    ) -> Result<Option<SalesData>, ProviderError> {
        Ok(self
            .sales
            .read()
            .await
            .get(&(user_id.to_string(), period))
            .copied())
    }

    async fn employee_profile(&self, user_id: &str) -> Result<EmployeeProfile, ProviderError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }
}
