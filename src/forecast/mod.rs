//! Forecast-table quantile interpolation.
//!
//! A [`QuantileInterpolator`] runs the fit-and-evaluate pipeline per time
//! step over a table of values at the [`QuantileGrid`]'s canonical levels and
//! extracts the requested output quantiles via exact fine-grid index mapping.

pub mod grid;
pub mod interpolator;

pub use grid::{FineGrid, QuantileGrid};
pub use interpolator::{
    InterpolatorConfig, QuantileInterpolator, QuantileTable, RowErrorPolicy, SkippedRow,
};
