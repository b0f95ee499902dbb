//! Per-period preferences.

/// Constant-relative-risk-aversion utility `c^(1-eta) / (1-eta)`.
///
/// `eta == 1` (log utility) is excluded by [`Parameters::validate`](crate::Parameters::validate).
/// At `c == 0` with `eta > 1` the result is negative infinity, which the
/// maximizers treat as an ordinary (dominated) value.
#[inline]
pub fn crra(consumption: f64, eta: f64) -> f64 {
    let exponent = 1.0 - eta;
    consumption.powf(exponent) / exponent
}
