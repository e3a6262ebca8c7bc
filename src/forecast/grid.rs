//! Canonical quantile grids and the fine evaluation lattice.
//!
//! Raw forecasts arrive at a fixed set of canonical probability levels. The
//! interpolator evaluates the fitted spline over a denser, evenly spaced
//! lattice spanning the canonical domain, then maps each requested output
//! level to a lattice index. The mapping is exact-or-error: a level that does
//! not land on a lattice point (within float tolerance) is rejected rather
//! than silently rounded.

use serde::{Deserialize, Serialize};

use crate::error::{self, FlowcastError};
use crate::validate::{validate_positive, validate_strictly_increasing};

/// Absolute tolerance for deciding whether a level lands on a lattice index.
const INDEX_TOLERANCE: f64 = 1e-6;

/// The canonical probability levels (percent) of one interpolation run.
///
/// Invariants: strictly increasing, each level in (0, 100), at least two
/// levels. Fixed for the lifetime of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileGrid {
    levels: Vec<f64>,
}

impl QuantileGrid {
    /// The eleven canonical levels raw forecast distributions are issued at:
    /// {1, 2.5, 5, 10, 25, 50, 75, 90, 95, 97.5, 99}.
    pub fn canonical() -> Self {
        Self {
            levels: vec![
                1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 97.5, 99.0,
            ],
        }
    }

    /// Create a grid from explicit levels in percent.
    ///
    /// # Errors
    /// [`FlowcastError::DegenerateControlSet`] if fewer than two levels are
    /// given, levels are not strictly increasing, or any level lies outside
    /// (0, 100).
    pub fn new(levels: Vec<f64>) -> error::Result<Self> {
        if levels.len() < 2 {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!("a quantile grid needs at least 2 levels, got {}", levels.len()),
            });
        }
        for &level in &levels {
            if !level.is_finite() || level <= 0.0 || level >= 100.0 {
                return Err(FlowcastError::DegenerateControlSet {
                    message: format!("quantile levels must lie in (0, 100), got {level}"),
                });
            }
        }
        validate_strictly_increasing(&levels, "levels")?;
        Ok(Self { levels })
    }

    /// The levels, in percent, strictly increasing.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Number of canonical levels; every input row must carry this many
    /// values.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false: the constructor rejects grids with fewer than 2 levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Lowest canonical level.
    pub fn lower(&self) -> f64 {
        self.levels[0]
    }

    /// Highest canonical level.
    pub fn upper(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }
}

/// An evenly spaced evaluation lattice spanning `[lower, upper]`.
///
/// Positions are `lower + i * increment`. When the span is not an exact
/// multiple of the increment, the lattice stops short of `upper`; a level
/// beyond the last lattice point maps to an error, never to a rounded
/// neighbor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineGrid {
    lower: f64,
    increment: f64,
    positions: Vec<f64>,
}

impl FineGrid {
    /// Build the lattice from `lower` to at most `upper` with the given
    /// step.
    ///
    /// # Errors
    /// [`FlowcastError::DegenerateControlSet`] if the increment is not
    /// positive and finite or `upper <= lower`.
    pub fn new(lower: f64, upper: f64, increment: f64) -> error::Result<Self> {
        validate_positive(increment, "increment")?;
        if !lower.is_finite() || !upper.is_finite() || upper <= lower {
            return Err(FlowcastError::DegenerateControlSet {
                message: format!("invalid fine grid span [{lower}, {upper}]"),
            });
        }
        let steps = ((upper - lower) / increment + INDEX_TOLERANCE).floor() as usize;
        let positions: Vec<f64> = (0..=steps)
            .map(|i| {
                let p = lower + increment * i as f64;
                // Land exactly on the upper bound when the span divides
                // evenly, so boundary queries stay inside the spline domain.
                if (p - upper).abs() < INDEX_TOLERANCE {
                    upper
                } else {
                    p
                }
            })
            .collect();
        Ok(Self {
            lower,
            increment,
            positions,
        })
    }

    /// The lattice positions, in percent, strictly increasing.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Number of lattice points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Never true: construction always yields at least one position.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Map a requested level to its lattice index:
    /// `index = round((level - lower) / increment)`.
    ///
    /// # Errors
    /// - [`FlowcastError::IncrementMismatch`] if the computed index is not
    ///   integral within tolerance.
    /// - [`FlowcastError::OutOfDomain`] if the level falls outside the
    ///   lattice span.
    pub fn index_of(&self, level: f64) -> error::Result<usize> {
        if !level.is_finite() {
            return Err(FlowcastError::OutOfDomain {
                query: level,
                min: self.lower,
                max: self.positions[self.positions.len() - 1],
            });
        }
        let exact = (level - self.lower) / self.increment;
        let nearest = exact.round();
        if (exact - nearest).abs() > INDEX_TOLERANCE {
            return Err(FlowcastError::IncrementMismatch {
                level,
                increment: self.increment,
            });
        }
        if nearest < 0.0 || nearest as usize >= self.positions.len() {
            return Err(FlowcastError::OutOfDomain {
                query: level,
                min: self.lower,
                max: self.positions[self.positions.len() - 1],
            });
        }
        Ok(nearest as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // --- QuantileGrid ---

    #[test]
    fn canonical_grid_has_eleven_levels() {
        let grid = QuantileGrid::canonical();
        assert_eq!(grid.len(), 11);
        assert_eq!(grid.lower(), 1.0);
        assert_eq!(grid.upper(), 99.0);
        assert!(!grid.is_empty());
    }

    #[test]
    fn rejects_levels_outside_open_interval() {
        assert!(QuantileGrid::new(vec![0.0, 50.0]).is_err());
        assert!(QuantileGrid::new(vec![50.0, 100.0]).is_err());
        assert!(QuantileGrid::new(vec![-1.0, 50.0]).is_err());
        assert!(QuantileGrid::new(vec![50.0, f64::NAN]).is_err());
    }

    #[test]
    fn rejects_unsorted_or_short_grids() {
        assert!(QuantileGrid::new(vec![50.0]).is_err());
        assert!(QuantileGrid::new(vec![50.0, 25.0]).is_err());
        assert!(QuantileGrid::new(vec![25.0, 25.0]).is_err());
        assert!(QuantileGrid::new(vec![5.0, 95.0]).is_ok());
    }

    // --- FineGrid construction ---

    #[test]
    fn lattice_spans_evenly_divisible_range() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        assert_eq!(grid.len(), 197);
        assert_abs_diff_eq!(grid.positions()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.positions()[196], 99.0, epsilon = 1e-12);
        assert!(!grid.is_empty());
    }

    #[test]
    fn lattice_with_unit_increment() {
        let grid = FineGrid::new(1.0, 99.0, 1.0).unwrap();
        assert_eq!(grid.len(), 99);
        assert_abs_diff_eq!(grid.positions()[49], 50.0, epsilon = 1e-12);
    }

    #[test]
    fn lattice_stops_short_of_non_divisible_upper() {
        // Span 98 with step 0.75 -> last point at 1 + 130*0.75 = 98.5.
        let grid = FineGrid::new(1.0, 99.0, 0.75).unwrap();
        assert_eq!(grid.len(), 131);
        assert!(grid.positions()[130] < 99.0);
    }

    #[test]
    fn rejects_bad_increment_or_span() {
        assert!(FineGrid::new(1.0, 99.0, 0.0).is_err());
        assert!(FineGrid::new(1.0, 99.0, -0.5).is_err());
        assert!(FineGrid::new(1.0, 99.0, f64::NAN).is_err());
        assert!(FineGrid::new(99.0, 1.0, 0.5).is_err());
        assert!(FineGrid::new(1.0, 1.0, 0.5).is_err());
    }

    // --- Index mapping ---

    #[test]
    fn maps_exact_levels_to_indices() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        assert_eq!(grid.index_of(1.0).unwrap(), 0);
        assert_eq!(grid.index_of(10.0).unwrap(), 18);
        assert_eq!(grid.index_of(50.0).unwrap(), 98);
        assert_eq!(grid.index_of(99.0).unwrap(), 196);
    }

    #[test]
    fn index_mapping_is_idempotent() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        let first = grid.index_of(42.5).unwrap();
        let second = grid.index_of(42.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_integral_index_is_an_increment_mismatch() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        match grid.index_of(10.3) {
            Err(FlowcastError::IncrementMismatch { level, increment }) => {
                assert_eq!(level, 10.3);
                assert_eq!(increment, 0.5);
            }
            other => panic!("expected IncrementMismatch, got {other:?}"),
        }
    }

    #[test]
    fn level_outside_span_is_out_of_domain() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        assert!(matches!(
            grid.index_of(0.5),
            Err(FlowcastError::OutOfDomain { .. })
        ));
        assert!(matches!(
            grid.index_of(99.5),
            Err(FlowcastError::OutOfDomain { .. })
        ));
        assert!(matches!(
            grid.index_of(f64::NAN),
            Err(FlowcastError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn edge_level_under_non_divisible_increment_is_rejected() {
        // 99 is not on the 0.75 lattice: (99 - 1) / 0.75 is non-integral.
        let grid = FineGrid::new(1.0, 99.0, 0.75).unwrap();
        assert!(matches!(
            grid.index_of(99.0),
            Err(FlowcastError::IncrementMismatch { .. })
        ));
    }

    #[test]
    fn float_drift_within_tolerance_still_maps() {
        let grid = FineGrid::new(1.0, 99.0, 0.5).unwrap();
        // 0.1-style accumulation noise far below the tolerance.
        assert_eq!(grid.index_of(10.000000001).unwrap(), 18);
    }
}
