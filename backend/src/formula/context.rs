// Formula DSL - Variable Bindings
//
// Maps the allow-listed variable names to numbers for one evaluation.
// Built from a sales snapshot plus the employee profile.

use crate::formula::types::is_allowed_variable;
use crate::models::{EmployeeProfile, SalesData};
use std::collections::HashMap;
use thiserror::Error;

/// Errors building a binding set by hand
#[derive(Debug, Error, PartialEq)]
pub enum BindingError {
    #[error("Variable '{0}' is not on the formula allow-list")]
    NotAllowed(String),
}

/// Variable name → value mapping for formula evaluation
///
/// # Variables
///
/// **Sales** (from `SalesData`):
/// - personalSales, sales (alias of personalSales)
/// - totalSales
/// - teamSales (0 when the provider has no team figure)
///
/// **Profile** (from `EmployeeProfile`, 0 when absent):
/// - baseSalary, years, performance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, f64>,
}

impl Bindings {
    /// Empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every allow-listed variable from a snapshot and profile
    ///
    /// # Example
    ///
    /// ```rust
    /// use incentive_engine_core_rs::formula::Bindings;
    /// use incentive_engine_core_rs::models::{EmployeeProfile, SalesData};
    ///
    /// let sales = SalesData::new(8_000_000.0, 50_000_000.0);
    /// let bindings = Bindings::build(&sales, &EmployeeProfile::default());
    /// assert_eq!(bindings.get("sales"), Some(8_000_000.0));
    /// assert_eq!(bindings.get("teamSales"), Some(0.0));
    /// ```
    pub fn build(sales: &SalesData, profile: &EmployeeProfile) -> Self {
        let mut values = HashMap::new();

        // Sales fields
        values.insert("personalSales".to_string(), sales.personal);
        values.insert("sales".to_string(), sales.personal);
        values.insert("totalSales".to_string(), sales.total);
        values.insert("teamSales".to_string(), sales.team.unwrap_or(0.0));

        // Profile fields
        values.insert("baseSalary".to_string(), profile.base_salary.unwrap_or(0.0));
        values.insert("years".to_string(), profile.years.unwrap_or(0.0));
        values.insert("performance".to_string(), profile.performance.unwrap_or(0.0));

        Self { values }
    }

    /// Bind from a sales snapshot alone (profile variables are 0)
    pub fn from_sales(sales: &SalesData) -> Self {
        Self::build(sales, &EmployeeProfile::default())
    }

    /// Set one variable, rejecting names outside the allow-list
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), BindingError> {
        if !is_allowed_variable(name) {
            return Err(BindingError::NotAllowed(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
