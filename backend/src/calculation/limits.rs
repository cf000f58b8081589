//! Limit/clamp policy shared by template and custom calculations
//!
//! `raw → clamp [minAmount ?? 0, maxAmount ?? +∞] → floor → clamp >= 0`
//!
//! Both calculation paths end here, so a custom formula reproducing a
//! template's expression yields the identical final amount.

use crate::models::IncentiveParameters;

/// Apply min/max caps, floor to a whole amount and floor at zero
///
/// NaN collapses to the lower bound. Callers reject non-finite raw values
/// before this point; +∞ without a cap saturates at `i64::MAX`.
///
/// # Example
///
/// ```rust
/// use incentive_engine_core_rs::calculation::apply_limits;
/// use incentive_engine_core_rs::models::IncentiveParameters;
///
/// let params = IncentiveParameters::default().with_max_amount(1_000_000.0);
/// assert_eq!(apply_limits(5_000_000.0, &params), 1_000_000);
/// assert_eq!(apply_limits(1234.99, &IncentiveParameters::default()), 1234);
/// ```
pub fn apply_limits(raw: f64, params: &IncentiveParameters) -> i64 {
    let lower = params.min_amount.unwrap_or(0.0);
    let upper = params.max_amount.unwrap_or(f64::INFINITY);

    // `f64::max` returns the other operand when one side is NaN
    let bounded = raw.max(lower).min(upper);
    let floored = bounded.floor().max(0.0);

    // Float → int casts saturate
    floored as i64
}
