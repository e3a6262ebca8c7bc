//! Curve construction and monotone spline fitting.
//!
//! The per-row pipeline starts here: a rate series or cumulative curve is
//! resolved into [`ControlPoints`], then [`HymanSpline::fit`] produces the
//! shape-constrained piecewise cubic that the forecast layer evaluates.

pub mod control;
pub mod hyman;

pub use control::{ControlPointBuilder, ControlPoints};
pub use hyman::HymanSpline;
