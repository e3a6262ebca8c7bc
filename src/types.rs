//! Core domain types shared across the crate.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes** — [`Level`] wraps probability levels carried in
//! output column metadata so callers can't mistake a level for a forecast
//! value.
//!
//! **Inputs use bare `f64`** — API methods like `value(position: f64)` accept
//! raw floats for ergonomics. Validation happens inside constructors and the
//! interpolator, not at every call site.
//!
//! # Why no `Eq` or `Ord`?
//! [`Level`] wraps `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

/// A probability level expressed in percent, e.g. `Level(97.5)`.
///
/// Canonical forecast quantiles are supplied at fixed levels in (0, 100);
/// requested output quantiles are levels within the canonical span.
///
/// # Examples
/// ```
/// use flowcast::types::Level;
/// let median = Level(50.0);
/// assert_eq!(median.0, 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Level(pub f64);

impl Level {
    /// Column label for this level: `"Q50"` for whole levels, `"Q97.5"`
    /// otherwise.
    pub fn label(&self) -> String {
        if self.0.fract() == 0.0 {
            format!("Q{}", self.0 as i64)
        } else {
            format!("Q{}", self.0)
        }
    }
}

/// Evaluation mode: what the control data represents and therefore what the
/// spline should return.
///
/// - [`Cdf`](Mode::Cdf): the input is already a cumulative curve; the desired
///   output is the curve's value.
/// - [`Rate`](Mode::Rate): the input was a rate series accumulated into a
///   cumulative curve; the desired output is the local rate, i.e. the first
///   derivative of the accumulated curve. Integrating that derivative over
///   any sub-interval reproduces exactly that sub-interval's share of the
///   original total, which is what makes upsampling mean-preserving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Evaluate the spline itself.
    #[default]
    Cdf,
    /// Evaluate the spline's first derivative.
    Rate,
}
