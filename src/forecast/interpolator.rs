//! Per-time-step quantile extraction over a forecast table.
//!
//! Each input row carries one value per canonical probability level. The
//! interpolator fits a Hyman spline through the row, evaluates it over the
//! fine lattice, and reads the requested output levels off the lattice by
//! exact index mapping. Rows are independent: nothing mutable is shared
//! across them, so with the `parallel` feature they are processed on a rayon
//! worker pool and reassembled in input order.

use serde::{Deserialize, Serialize};

use crate::curve::{ControlPointBuilder, ControlPoints, HymanSpline};
use crate::error::{self, FlowcastError};
use crate::forecast::grid::{FineGrid, QuantileGrid};
use crate::types::{Level, Mode};
use crate::validate::validate_all_finite;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Disposition of a row whose interpolation fails.
///
/// The core makes this an explicit configuration choice rather than a hidden
/// behavior: either the first failing row aborts the whole table, or failing
/// rows are recorded in the output's skip payload and the rest proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowErrorPolicy {
    /// The first row error aborts the whole table.
    #[default]
    Abort,
    /// Failing rows are recorded and skipped; their output slot is `None`.
    Skip,
}

/// Configuration for one interpolation run.
///
/// # Examples
///
/// ```
/// use flowcast::forecast::InterpolatorConfig;
///
/// let config = InterpolatorConfig::new(vec![10.0, 50.0, 90.0])
///     .increment(0.5)
///     .decimals(Some(1));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolatorConfig {
    /// Requested output quantile levels in percent (positions in rate mode).
    pub levels: Vec<f64>,
    /// Fine-grid step size in percentage points.
    pub increment: f64,
    /// Whether rows are cumulative distributions or rate series.
    pub mode: Mode,
    /// Per-row failure disposition.
    pub row_errors: RowErrorPolicy,
    /// Output rounding in decimal places; `None` infers each row's native
    /// precision from its input values.
    pub decimals: Option<u32>,
}

impl InterpolatorConfig {
    /// Configuration with the given output levels and the defaults:
    /// increment 0.5, CDF mode, abort on row error, inferred rounding.
    pub fn new(levels: Vec<f64>) -> Self {
        Self {
            levels,
            increment: 0.5,
            mode: Mode::default(),
            row_errors: RowErrorPolicy::default(),
            decimals: None,
        }
    }

    /// Set the fine-grid increment in percentage points.
    pub fn increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Set the evaluation mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the per-row failure disposition.
    pub fn row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }

    /// Set or clear explicit output rounding.
    pub fn decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }
}

/// A row recorded and skipped under [`RowErrorPolicy::Skip`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Positional index of the failing input row.
    pub row: usize,
    /// The error that row produced.
    #[serde(skip)]
    pub error: Option<FlowcastError>,
}

/// The interpolated output table.
///
/// Rows are positionally aligned with the input table: row `i` of the output
/// corresponds to row `i` of the input, so the caller's time index carries
/// over unchanged. A `None` row was skipped; the reason is in
/// [`skipped`](Self::skipped), so "no data" is distinguishable from
/// "computed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileTable {
    columns: Vec<String>,
    rows: Vec<Option<Vec<f64>>>,
    skipped: Vec<SkippedRow>,
}

impl QuantileTable {
    /// Output column labels, one per requested level (`"Q10"`, `"Q97.5"`).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All output rows, `None` where a row was skipped.
    pub fn rows(&self) -> &[Option<Vec<f64>>] {
        &self.rows
    }

    /// One output row, if it was computed.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).and_then(|r| r.as_deref())
    }

    /// Rows recorded and skipped, with their errors.
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    /// True when every input row produced output.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of rows (computed and skipped).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True for an empty input table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Interpolates a table of per-step quantile values to requested output
/// levels.
///
/// # Examples
///
/// ```
/// use flowcast::forecast::{InterpolatorConfig, QuantileGrid, QuantileInterpolator};
///
/// let grid = QuantileGrid::new(vec![1.0, 25.0, 50.0, 75.0, 99.0]).unwrap();
/// let config = InterpolatorConfig::new(vec![50.0]).increment(1.0);
/// let interp = QuantileInterpolator::new(grid, config).unwrap();
///
/// let table = interp
///     .interpolate(&[vec![0.0, 20.0, 50.0, 80.0, 100.0]])
///     .unwrap();
/// assert_eq!(table.row(0).unwrap(), &[50.0]);
/// ```
#[derive(Debug, Clone)]
pub struct QuantileInterpolator {
    grid: QuantileGrid,
    config: InterpolatorConfig,
}

impl QuantileInterpolator {
    /// Create an interpolator over the given canonical grid.
    ///
    /// In CDF mode the requested levels are checked against the fine lattice
    /// up front, so a level that can never be represented fails here rather
    /// than on the first row.
    ///
    /// # Errors
    /// [`FlowcastError::DegenerateControlSet`] for an empty or non-finite
    /// level list or a bad increment; [`FlowcastError::IncrementMismatch`] /
    /// [`FlowcastError::OutOfDomain`] for unrepresentable levels.
    pub fn new(grid: QuantileGrid, config: InterpolatorConfig) -> error::Result<Self> {
        if config.levels.is_empty() {
            return Err(FlowcastError::DegenerateControlSet {
                message: "at least one requested output level is required".into(),
            });
        }
        validate_all_finite(&config.levels, "levels")?;
        if config.mode == Mode::Cdf {
            let fine = FineGrid::new(grid.lower(), grid.upper(), config.increment)?;
            for &level in &config.levels {
                fine.index_of(level)?;
            }
        }
        Ok(Self { grid, config })
    }

    /// Column labels this interpolator produces.
    pub fn column_labels(&self) -> Vec<String> {
        self.config.levels.iter().map(|&q| Level(q).label()).collect()
    }

    /// Interpolate every row of the input table.
    ///
    /// Each row must hold exactly one value per canonical grid level in CDF
    /// mode ([`FlowcastError::RowLength`] otherwise); in rate mode all rows
    /// must share the first row's length.
    ///
    /// # Errors
    /// Under [`RowErrorPolicy::Abort`], the first row error is returned.
    /// Under [`RowErrorPolicy::Skip`], row errors land in the output's skip
    /// payload and only configuration-level failures are returned.
    pub fn interpolate(&self, rows: &[Vec<f64>]) -> error::Result<QuantileTable> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            n_rows = rows.len(),
            mode = ?self.config.mode,
            increment = self.config.increment,
            "table interpolation started"
        );

        let columns = self.column_labels();
        if rows.is_empty() {
            return Ok(QuantileTable {
                columns,
                rows: Vec::new(),
                skipped: Vec::new(),
            });
        }

        // The lattice and the requested indices depend only on the run, not
        // on row values: resolve them once. In rate mode the span is set by
        // the first row's interval count.
        let width = match self.config.mode {
            Mode::Cdf => self.grid.len(),
            Mode::Rate => rows[0].len(),
        };
        let fine = match self.config.mode {
            Mode::Cdf => FineGrid::new(self.grid.lower(), self.grid.upper(), self.config.increment)?,
            Mode::Rate => FineGrid::new(0.0, width as f64, self.config.increment)?,
        };
        let indices: Vec<usize> = self
            .config
            .levels
            .iter()
            .map(|&q| fine.index_of(q))
            .collect::<error::Result<_>>()?;

        let run_row = |(i, row): (usize, &Vec<f64>)| self.interpolate_row(i, row, width, &fine, &indices);

        #[cfg(feature = "parallel")]
        let results: Vec<error::Result<Vec<f64>>> =
            rows.par_iter().enumerate().map(run_row).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<error::Result<Vec<f64>>> =
            rows.iter().enumerate().map(run_row).collect();

        let mut out_rows = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(values) => out_rows.push(Some(values)),
                Err(err) => match self.config.row_errors {
                    RowErrorPolicy::Abort => return Err(err),
                    RowErrorPolicy::Skip => {
                        out_rows.push(None);
                        skipped.push(SkippedRow {
                            row: i,
                            error: Some(err),
                        });
                    }
                },
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_rows = out_rows.len(),
            n_skipped = skipped.len(),
            "table interpolation complete"
        );

        Ok(QuantileTable {
            columns,
            rows: out_rows,
            skipped,
        })
    }

    /// Fit-and-extract pipeline for one row.
    fn interpolate_row(
        &self,
        index: usize,
        row: &[f64],
        width: usize,
        fine: &FineGrid,
        indices: &[usize],
    ) -> error::Result<Vec<f64>> {
        if row.len() != width {
            return Err(FlowcastError::RowLength {
                row: index,
                expected: width,
                actual: row.len(),
            });
        }

        let points = match self.config.mode {
            // The row already is a cumulative distribution over the grid.
            Mode::Cdf => ControlPoints::new(self.grid.levels().to_vec(), row.to_vec())?,
            // The row is a rate series: accumulate it first, then read
            // rates back off the fitted curve's slope.
            Mode::Rate => ControlPointBuilder::new().rate_series(row.to_vec()).build()?,
        };
        let spline = HymanSpline::fit(points);
        let samples = spline.evaluate(fine.positions(), self.config.mode)?;

        let decimals = self.config.decimals.unwrap_or_else(|| native_decimals(row));
        Ok(indices
            .iter()
            .map(|&idx| round_to(samples[idx], decimals))
            .collect())
    }
}

/// Largest number of decimal places any value in the row carries, capped at 6.
///
/// Used to round outputs to the source data's native precision when no
/// explicit rounding was configured.
fn native_decimals(values: &[f64]) -> u32 {
    for k in 0..6u32 {
        let factor = 10f64.powi(k as i32);
        if values
            .iter()
            .all(|v| (v * factor - (v * factor).round()).abs() < 1e-6)
        {
            return k;
        }
    }
    6
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
