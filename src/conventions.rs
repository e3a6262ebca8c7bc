//! Hydrologic unit conventions.
//!
//! Flow-rate and storage-volume conversions shared by callers that feed the
//! interpolator with gauge data in cubic feet per second (cfs) and consume
//! results in acre-feet.

use crate::algebra::sum_product;
use crate::error;

/// One cfs flowing for one day is one second-foot-day, which is 1.9835
/// acre-feet.
pub const ACRE_FEET_PER_SFD: f64 = 1.9835;

/// Convert a flow rate in cfs to an accumulation rate in acre-feet per day.
pub fn cfs_to_acre_feet_per_day(cfs: f64) -> f64 {
    cfs * ACRE_FEET_PER_SFD
}

/// Convert an accumulation rate in acre-feet per day back to cfs.
pub fn acre_feet_per_day_to_cfs(af_per_day: f64) -> f64 {
    af_per_day / ACRE_FEET_PER_SFD
}

/// Estimate reservoir storage (acre-feet) from a forebay elevation (feet)
/// using a quadratic stage-storage curve `a·e² + b·e + c`.
///
/// Coefficients come from each reservoir's published stage-storage table fit.
///
/// # Errors
/// [`FlowcastError::LengthMismatch`](crate::FlowcastError) if `coefficients`
/// does not hold exactly the three quadratic terms.
pub fn storage_volume(coefficients: &[f64], elevation: f64) -> error::Result<f64> {
    sum_product(&[coefficients, &[elevation * elevation, elevation, 1.0]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cfs_round_trips_through_acre_feet() {
        let cfs = 1234.5;
        let af = cfs_to_acre_feet_per_day(cfs);
        assert_abs_diff_eq!(acre_feet_per_day_to_cfs(af), cfs, epsilon = 1e-10);
    }

    #[test]
    fn one_cfs_day_is_one_sfd() {
        assert_abs_diff_eq!(cfs_to_acre_feet_per_day(1.0), 1.9835, epsilon = 1e-12);
    }

    #[test]
    fn storage_volume_evaluates_the_quadratic() {
        // a·e² + b·e + c at e = 10: 2·100 + 3·10 + 5 = 235.
        let vol = storage_volume(&[2.0, 3.0, 5.0], 10.0).unwrap();
        assert_abs_diff_eq!(vol, 235.0, epsilon = 1e-12);
    }

    #[test]
    fn storage_volume_rejects_wrong_coefficient_count() {
        assert!(storage_volume(&[2.0, 3.0], 10.0).is_err());
    }
}
