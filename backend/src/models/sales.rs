//! Calculation inputs: sales snapshot, employee profile, payroll period
//!
//! All of these are supplied by external providers and never mutated by the
//! engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sales figures for one employee and one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    /// Employee's own sales
    pub personal: f64,

    /// Company (or unit) total sales
    pub total: f64,

    /// Team sales, when the sales provider tracks teams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<f64>,
}

impl SalesData {
    pub fn new(personal: f64, total: f64) -> Self {
        Self {
            personal,
            total,
            team: None,
        }
    }

    pub fn with_team(mut self, team: f64) -> Self {
        self.team = Some(team);
        self
    }

    /// Representative dataset used to smoke-test custom formulas
    pub fn sample() -> Self {
        Self {
            personal: 10_000_000.0,
            total: 100_000_000.0,
            team: Some(30_000_000.0),
        }
    }
}

/// Non-sales employee facts a custom formula may reference
///
/// Absent values bind to 0 in formulas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<f64>,

    /// Years of service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<f64>,

    /// Performance score (1.0 = on target)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
}

impl EmployeeProfile {
    /// Profile used alongside `SalesData::sample()` during validation
    pub fn sample() -> Self {
        Self {
            base_salary: Some(3_000_000.0),
            years: Some(5.0),
            performance: Some(1.0),
        }
    }
}

// ============================================================================
// Payroll Period
// ============================================================================

/// Errors parsing a "YYYY-MM" period
#[derive(Debug, Error, PartialEq)]
pub enum PeriodError {
    #[error("Period must be formatted as YYYY-MM, got '{0}'")]
    Malformed(String),

    #[error("Invalid month {0} (expected 1-12)")]
    InvalidMonth(u32),
}

/// Calendar month a payroll calculation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| Self {
                year: date.year(),
                month: date.month(),
            })
            .ok_or(PeriodError::InvalidMonth(month))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4
            || month.is_empty()
            || month.len() > 2
            || !digits(year)
            || !digits(month)
        {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parses_and_displays() {
        let period: YearMonth = "2024-05".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 5);
        assert_eq!(period.to_string(), "2024-05");
        assert_eq!("2024-5".parse::<YearMonth>().unwrap(), period);
    }

    #[test]
    fn test_year_month_rejects_bad_input() {
        assert_eq!("2024-13".parse::<YearMonth>(), Err(PeriodError::InvalidMonth(13)));
        assert_eq!("2024-00".parse::<YearMonth>(), Err(PeriodError::InvalidMonth(0)));
        assert!(matches!("202405".parse::<YearMonth>(), Err(PeriodError::Malformed(_))));
        assert!(matches!("24-05".parse::<YearMonth>(), Err(PeriodError::Malformed(_))));
        assert!(matches!("2024-May".parse::<YearMonth>(), Err(PeriodError::Malformed(_))));
        assert!(matches!("2024-+5".parse::<YearMonth>(), Err(PeriodError::Malformed(_))));
        assert!(matches!("+202-05".parse::<YearMonth>(), Err(PeriodError::Malformed(_))));
    }

    #[test]
    fn test_year_month_serde_as_string() {
        let period = YearMonth::new(2023, 11).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2023-11\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }

    #[test]
    fn test_sales_data_team_is_optional() {
        let sales: SalesData = serde_json::from_str(r#"{"personal": 1.0, "total": 2.0}"#).unwrap();
        assert_eq!(sales.team, None);
    }
}
