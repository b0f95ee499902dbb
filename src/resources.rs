//! Resources available for consumption and saving at every grid cell.

use nalgebra::{DMatrix, DVector};

/// Builds `ydepK(i, j) = K[i]^alpha * Z[j] + (1 - delta) * K[i]`.
///
/// Rows index capital and columns index productivity. The result depends
/// only on its arguments, so it is recomputed at every step.
pub fn resource_grid(
    capital: &DVector<f64>,
    productivity: &DVector<f64>,
    alpha: f64,
    delta: f64,
) -> DMatrix<f64> {
    let mut ydepk = capital.map(|k| k.powf(alpha)) * productivity.transpose();
    for mut column in ydepk.column_iter_mut() {
        column.axpy(1.0 - delta, capital, 1.0);
    }
    ydepk
}
