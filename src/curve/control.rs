//! Control point construction from rate series or cumulative curves.
//!
//! A [`ControlPointBuilder`] resolves the two possible source shapes once, at
//! the boundary: a **rate series** (one magnitude accrued over each of N
//! equal-footing intervals) is turned into a cumulative curve by prefix
//! summation, while an already-**cumulative** curve passes through unchanged.
//! Supplying both or neither is an [`FlowcastError::InputAmbiguity`].

use serde::{Deserialize, Serialize};

use crate::error::{self, FlowcastError};
use crate::validate::{validate_all_finite, validate_strictly_increasing};

/// An ordered set of `(x, y)` control points with strictly increasing `x`.
///
/// Immutable once built. The constructor enforces the invariants every
/// downstream step relies on: at least 2 points, equal column lengths,
/// strictly monotonic finite `x`, finite `y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPoints {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl ControlPoints {
    /// Create a control point set from parallel `x`/`y` columns.
    ///
    /// # Errors
    /// Returns [`FlowcastError::DegenerateControlSet`] if fewer than 2 points
    /// are given, lengths differ, `x` is not strictly increasing, or any
    /// value is not finite.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> error::Result<Self> {
        if xs.len() != ys.len() {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!(
                    "x and y must have the same length, got {} and {}",
                    xs.len(),
                    ys.len()
                ),
            });
        }
        if xs.len() < 2 {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!("at least 2 control points required, got {}", xs.len()),
            });
        }
        validate_all_finite(&xs, "x")?;
        validate_all_finite(&ys, "y")?;
        validate_strictly_increasing(&xs, "x")?;
        Ok(Self { xs, ys })
    }

    /// The x-positions (probability levels or step boundaries).
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// The cumulative values at each x-position.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false: the constructor rejects sets with fewer than 2 points.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Decompose into `(x, y)` columns, giving the fitter ownership.
    pub(crate) fn into_columns(self) -> (Vec<f64>, Vec<f64>) {
        (self.xs, self.ys)
    }
}

/// Builder resolving a rate series or a cumulative curve into
/// [`ControlPoints`].
///
/// Exactly one of [`rate_series`](Self::rate_series) and
/// [`cumulative`](Self::cumulative) must be supplied. Positions are optional;
/// when omitted, `N + 1` evenly spaced positions `0..=N` are generated
/// (`N` = interval count for a rate series, `len - 1` for a cumulative
/// curve).
///
/// # Examples
///
/// ```
/// use flowcast::curve::ControlPointBuilder;
///
/// // Monthly inflows accumulate to [0, 1, 3, 6, 10].
/// let points = ControlPointBuilder::new()
///     .rate_series(vec![1.0, 2.0, 3.0, 4.0])
///     .build()
///     .unwrap();
/// assert_eq!(points.ys(), &[0.0, 1.0, 3.0, 6.0, 10.0]);
/// ```
#[derive(Debug, Default)]
pub struct ControlPointBuilder {
    rates: Option<Vec<f64>>,
    cumulative: Option<Vec<f64>>,
    positions: Option<Vec<f64>>,
}

impl ControlPointBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a rate series: one magnitude per interval.
    pub fn rate_series(mut self, rates: Vec<f64>) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Supply an already-cumulative curve.
    pub fn cumulative(mut self, values: Vec<f64>) -> Self {
        self.cumulative = Some(values);
        self
    }

    /// Supply explicit x-positions (probability levels or step boundaries)
    /// for uneven spacing. Must have one entry per control point, i.e.
    /// `rates.len() + 1` for a rate series or `values.len()` for a
    /// cumulative curve.
    pub fn positions(mut self, positions: Vec<f64>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Resolve the input into a [`ControlPoints`] set.
    ///
    /// For the rate-series case the cumulative curve is built by prefix
    /// summation, each increment weighted by its x-interval width:
    /// `y[i+1] = y[i] + rate[i] * (x[i+1] - x[i])`, with `y[0] = 0`. The
    /// final cumulative value therefore equals the exact weighted total of
    /// the input series, which is the mean-preservation invariant.
    ///
    /// # Errors
    /// - [`FlowcastError::InputAmbiguity`] if both or neither source was set.
    /// - [`FlowcastError::LengthMismatch`] if explicit positions do not match
    ///   the expected control point count.
    /// - [`FlowcastError::DegenerateControlSet`] for invalid point data.
    pub fn build(self) -> error::Result<ControlPoints> {
        match (self.rates, self.cumulative) {
            (Some(_), Some(_)) => Err(FlowcastError::InputAmbiguity {
                message: "both a rate series and a cumulative curve were supplied".into(),
            }),
            (None, None) => Err(FlowcastError::InputAmbiguity {
                message: "neither a rate series nor a cumulative curve was supplied".into(),
            }),
            (Some(rates), None) => {
                validate_all_finite(&rates, "rates")?;
                let xs = resolve_positions(self.positions, rates.len() + 1, "rate series")?;
                let mut ys = vec![0.0; xs.len()];
                for i in 0..rates.len() {
                    ys[i + 1] = ys[i] + rates[i] * (xs[i + 1] - xs[i]);
                }
                ControlPoints::new(xs, ys)
            }
            (None, Some(values)) => {
                let xs = resolve_positions(self.positions, values.len(), "cumulative curve")?;
                ControlPoints::new(xs, values)
            }
        }
    }
}

/// Use explicit positions if given (checking the count), else generate
/// evenly spaced positions `0..n`.
fn resolve_positions(
    positions: Option<Vec<f64>>,
    expected: usize,
    source: &str,
) -> error::Result<Vec<f64>> {
    match positions {
        Some(px) => {
            if px.len() != expected {
                return Err(FlowcastError::LengthMismatch {
                    message: format!("positions for a {source}"),
                    expected,
                    actual: px.len(),
                });
            }
            Ok(px)
        }
        None => Ok((0..expected).map(|i| i as f64).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // --- ControlPoints invariants ---

    #[test]
    fn rejects_single_point() {
        let result = ControlPoints::new(vec![0.0], vec![1.0]);
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_columns() {
        let result = ControlPoints::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
    }

    #[test]
    fn rejects_non_increasing_x() {
        let result = ControlPoints::new(vec![0.0, 2.0, 2.0], vec![0.0, 1.0, 2.0]);
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
    }

    #[test]
    fn rejects_nan_values() {
        let result = ControlPoints::new(vec![0.0, 1.0], vec![0.0, f64::NAN]);
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
        let result = ControlPoints::new(vec![0.0, f64::INFINITY], vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
    }

    #[test]
    fn two_points_suffice() {
        let points = ControlPoints::new(vec![0.0, 1.0], vec![0.0, 5.0]).unwrap();
        assert_eq!(points.len(), 2);
        assert!(!points.is_empty());
    }

    // --- Builder input resolution ---

    #[test]
    fn both_sources_is_ambiguous() {
        let result = ControlPointBuilder::new()
            .rate_series(vec![1.0, 2.0])
            .cumulative(vec![0.0, 1.0, 3.0])
            .build();
        assert!(matches!(result, Err(FlowcastError::InputAmbiguity { .. })));
    }

    #[test]
    fn neither_source_is_ambiguous() {
        let result = ControlPointBuilder::new().build();
        assert!(matches!(result, Err(FlowcastError::InputAmbiguity { .. })));
    }

    #[test]
    fn rate_series_prefix_sums_with_unit_spacing() {
        let points = ControlPointBuilder::new()
            .rate_series(vec![1.0, 2.0, 3.0, 4.0])
            .build()
            .unwrap();
        assert_eq!(points.xs(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(points.ys(), &[0.0, 1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn rate_series_weights_increments_by_interval_width() {
        // Uneven spacing: widths 2 and 3, rates 1 and 4 -> [0, 2, 14].
        let points = ControlPointBuilder::new()
            .rate_series(vec![1.0, 4.0])
            .positions(vec![0.0, 2.0, 5.0])
            .build()
            .unwrap();
        assert_abs_diff_eq!(points.ys()[1], 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(points.ys()[2], 14.0, epsilon = 1e-14);
    }

    #[test]
    fn rate_total_is_preserved_at_right_boundary() {
        let rates = vec![3.2, 0.7, 5.5, 2.1, 4.4];
        let points = ControlPointBuilder::new()
            .rate_series(rates.clone())
            .build()
            .unwrap();
        let total: f64 = rates.iter().sum();
        assert_abs_diff_eq!(*points.ys().last().unwrap(), total, epsilon = 1e-12);
    }

    #[test]
    fn cumulative_passes_through_unchanged() {
        let points = ControlPointBuilder::new()
            .cumulative(vec![0.0, 20.0, 50.0, 80.0, 100.0])
            .positions(vec![1.0, 25.0, 50.0, 75.0, 99.0])
            .build()
            .unwrap();
        assert_eq!(points.ys(), &[0.0, 20.0, 50.0, 80.0, 100.0]);
        assert_eq!(points.xs(), &[1.0, 25.0, 50.0, 75.0, 99.0]);
    }

    #[test]
    fn cumulative_without_positions_gets_even_spacing() {
        let points = ControlPointBuilder::new()
            .cumulative(vec![0.0, 1.0, 4.0])
            .build()
            .unwrap();
        assert_eq!(points.xs(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn wrong_position_count_for_rate_series() {
        let result = ControlPointBuilder::new()
            .rate_series(vec![1.0, 2.0, 3.0])
            .positions(vec![0.0, 1.0, 2.0]) // needs 4
            .build();
        match result {
            Err(FlowcastError::LengthMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn wrong_position_count_for_cumulative() {
        let result = ControlPointBuilder::new()
            .cumulative(vec![0.0, 1.0, 4.0])
            .positions(vec![0.0, 1.0])
            .build();
        assert!(matches!(result, Err(FlowcastError::LengthMismatch { .. })));
    }

    #[test]
    fn nan_rate_is_rejected() {
        let result = ControlPointBuilder::new()
            .rate_series(vec![1.0, f64::NAN])
            .build();
        assert!(matches!(
            result,
            Err(FlowcastError::DegenerateControlSet { .. })
        ));
    }

    #[test]
    fn control_points_serde_round_trip() {
        let points = ControlPoints::new(vec![0.0, 1.0, 2.0], vec![0.0, 3.0, 4.0]).unwrap();
        let json = serde_json::to_string(&points).unwrap();
        let back: ControlPoints = serde_json::from_str(&json).unwrap();
        assert_eq!(points.xs(), back.xs());
        assert_eq!(points.ys(), back.ys());
    }
}
