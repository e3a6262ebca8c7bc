//! Generic multi-vector algebra.
//!
//! [`sum_product`] is the spreadsheet-style n-ary dot product used by the
//! unit-conversion helpers in [`conventions`](crate::conventions).

use crate::error::{self, FlowcastError};

/// Element-wise product of two or more equal-length vectors, summed.
///
/// # Errors
/// [`FlowcastError::LengthMismatch`] if fewer than two vectors are given or
/// any vector's length differs from the first's.
///
/// # Examples
/// ```
/// use flowcast::algebra::sum_product;
///
/// let dot = sum_product(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
/// assert_eq!(dot, 32.0);
/// ```
pub fn sum_product(vectors: &[&[f64]]) -> error::Result<f64> {
    if vectors.len() < 2 {
        return Err(FlowcastError::LengthMismatch {
            message: "sum_product needs at least two vectors".into(),
            expected: 2,
            actual: vectors.len(),
        });
    }
    let len = vectors[0].len();
    for v in &vectors[1..] {
        if v.len() != len {
            return Err(FlowcastError::LengthMismatch {
                message: "sum_product vectors must have equal length".into(),
                expected: len,
                actual: v.len(),
            });
        }
    }
    Ok((0..len)
        .map(|i| vectors.iter().map(|v| v[i]).product::<f64>())
        .sum())
}
