//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::FlowcastError;

/// Validate that a value is strictly positive and finite.
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FlowcastError::DegenerateControlSet {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that every element of a slice is finite.
pub(crate) fn validate_all_finite(values: &[f64], name: &str) -> crate::error::Result<()> {
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!("{name}[{i}] must be finite, got {v}"),
            });
        }
    }
    Ok(())
}

/// Validate that a slice is strictly increasing.
pub(crate) fn validate_strictly_increasing(values: &[f64], name: &str) -> crate::error::Result<()> {
    for (i, w) in values.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!(
                    "{name} must be strictly increasing, but {name}[{}]={} >= {name}[{}]={}",
                    i,
                    w[0],
                    i + 1,
                    w[1]
                ),
            });
        }
    }
    Ok(())
}
