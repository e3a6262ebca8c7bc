//! Error types for the flowcast library.
//!
//! All fallible operations return `Result<T, FlowcastError>` rather than
//! panicking. Every failure is detected synchronously and is local to one
//! request; the core does no I/O, so there is no transient/fatal distinction
//! and no retry behavior.
//!
//! Errors are `Clone` so that a table run configured to skip failing rows can
//! record each row's error in the output payload.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, FlowcastError>;

/// Errors that can occur during curve construction, spline evaluation, and
/// forecast table interpolation.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum FlowcastError {
    /// Both or neither of rate-series / cumulative-curve inputs were supplied.
    #[error("ambiguous input: {message}")]
    InputAmbiguity { message: String },

    /// Fewer than 2 control points, non-strictly-increasing x-positions, or
    /// non-finite values.
    #[error("degenerate control set: {message}")]
    DegenerateControlSet { message: String },

    /// An evaluation query lies outside the spline's domain.
    #[error("query {query} outside domain [{min}, {max}]")]
    OutOfDomain { query: f64, min: f64, max: f64 },

    /// A requested output quantile level cannot be mapped to an exact
    /// fine-grid index under the configured increment.
    #[error("level {level} is not representable on a grid with increment {increment}")]
    IncrementMismatch { level: f64, increment: f64 },

    /// A table row's value count does not match the expected width.
    #[error("row {row} has {actual} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Vector lengths do not match.
    #[error("length mismatch: {message} (expected {expected}, got {actual})")]
    LengthMismatch {
        message: String,
        expected: usize,
        actual: usize,
    },
}
