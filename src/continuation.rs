//! Discounted expectations of next-period value under the productivity Markov chain.

use nalgebra::{DMatrix, DVector};

/// Expected next-period value for each candidate capital index in `[klo, khi]`.
///
/// Computes `V0[klo..=khi, :] * p_row`, where `p_row` is the transition row
/// of the current productivity state stored as a column vector. Element
/// `k - klo` of the result holds the expectation at capital index `k`.
///
/// Panics if the range is empty or falls outside `v0`.
pub fn continuation_values(
    v0: &DMatrix<f64>,
    klo: usize,
    khi: usize,
    p_row: &DVector<f64>,
) -> DVector<f64> {
    assert!(klo <= khi, "empty candidate range [{klo}, {khi}]");
    v0.rows(klo, khi - klo + 1) * p_row
}

/// Expected next-period value at a single capital index.
///
/// Uses the same product as [`continuation_values`] over a one-row range.
pub fn continuation_value_at(v0: &DMatrix<f64>, k: usize, p_row: &DVector<f64>) -> f64 {
    continuation_values(v0, k, k, p_row)[0]
}
