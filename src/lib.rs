//! # flowcast
//!
//! Mean-preserving, monotone quantile interpolation for probabilistic
//! hydrologic forecasts.
//!
//! Disaggregates a coarse, quantile-described forecast (eleven canonical
//! probability levels per time step) into a smooth, arbitrarily fine-grained
//! quantile forecast, guaranteeing that the interpolated series conserves the
//! original's total mass and that cumulative distributions never decrease
//! between knots.
//!
//! ## Architecture
//!
//! - **`curve`** — Control point construction (rate series → cumulative
//!   curve) and the Hyman-filtered monotone cubic Hermite spline
//! - **`forecast`** — Canonical/fine quantile grids and the per-time-step
//!   table interpolator
//! - **`algebra`** — n-ary dot product helper
//! - **`conventions`** — Hydrologic unit conversions (cfs, acre-feet,
//!   stage-storage curves)
//!
//! ## Design
//!
//! - **No panics.** Every fallible operation returns [`Result`]. Library
//!   code never calls `unwrap()` or `expect()`.
//! - **Immutable curves.** A [`ControlPoints`] set and the [`HymanSpline`]
//!   fitted from it cannot be modified after construction.
//! - **Row independence.** Each table row's fit-and-evaluate pipeline
//!   depends only on that row; with the `parallel` feature rows run on a
//!   rayon pool and are reassembled in input order.
//! - **Exact-or-error mapping.** A requested output level that does not land
//!   on the fine lattice is rejected, never silently rounded to a neighbor.
//! - **Serializable.** Value types, fitted splines, grids, and output tables
//!   implement Serde `Serialize` / `Deserialize`.

pub mod algebra;
pub mod conventions;
pub mod curve;
pub mod error;
pub mod forecast;
pub mod types;
mod validate;

#[doc(inline)]
pub use curve::{ControlPointBuilder, ControlPoints, HymanSpline};
#[doc(inline)]
pub use error::{FlowcastError, Result};
#[doc(inline)]
pub use forecast::{InterpolatorConfig, QuantileGrid, QuantileInterpolator, QuantileTable};
#[doc(inline)]
pub use types::{Level, Mode};
