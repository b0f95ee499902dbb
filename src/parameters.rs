//! Model calibration and the maximization strategy selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VfiError};
use crate::maximize::{BinaryMaximizer, GridMaximizer, Maximizer};

/// Strategy used to maximize the Bellman right-hand side over next-period capital.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxType {
    /// Exhaustive scan over every feasible grid point.
    Grid,
    /// Bisection on the slope of a concave return sequence.
    Binary,
}

impl MaxType {
    /// Returns the strategy object for this selector.
    ///
    /// The choice is resolved once per step rather than per grid cell.
    pub fn maximizer(self) -> &'static dyn Maximizer {
        match self {
            MaxType::Grid => &GridMaximizer,
            MaxType::Binary => &BinaryMaximizer,
        }
    }

    /// Canonical lowercase name of the selector.
    pub fn as_str(self) -> &'static str {
        match self {
            MaxType::Grid => "grid",
            MaxType::Binary => "binary",
        }
    }
}

impl fmt::Display for MaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaxType {
    type Err = VfiError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" | "g" => Ok(MaxType::Grid),
            "binary" | "b" => Ok(MaxType::Binary),
            _ => Err(VfiError::InvalidMaxType {
                value: value.to_string(),
            }),
        }
    }
}

/// Scalar calibration of the stochastic growth model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Number of capital grid points.
    pub nk: usize,
    /// Number of productivity states.
    pub nz: usize,
    /// Curvature of CRRA utility. Must be positive and different from one.
    pub eta: f64,
    /// Discount factor in `(0, 1)`.
    pub beta: f64,
    /// Capital share of output in `(0, 1)`.
    pub alpha: f64,
    /// Depreciation rate in `[0, 1]`.
    pub delta: f64,
    /// Maximization strategy.
    pub maxtype: MaxType,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            nk: 1_000,
            nz: 4,
            eta: 2.0,
            beta: 0.984,
            alpha: 0.35,
            delta: 0.01,
            maxtype: MaxType::Binary,
        }
    }
}

impl Parameters {
    /// Override the grid dimensions while keeping other defaults.
    pub fn with_dimensions(mut self, nk: usize, nz: usize) -> Self {
        self.nk = nk;
        self.nz = nz;
        self
    }

    /// Set the utility curvature.
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Set the discount factor.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the capital share.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the depreciation rate.
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Choose the maximization strategy.
    pub fn with_maxtype(mut self, maxtype: MaxType) -> Self {
        self.maxtype = maxtype;
        self
    }

    /// Checks every scalar against its admissible range.
    pub fn validate(&self) -> Result<()> {
        if self.nk == 0 {
            return Err(VfiError::invalid_parameter(
                "nk",
                0.0,
                "capital grid needs at least one point",
            ));
        }
        if self.nz == 0 {
            return Err(VfiError::invalid_parameter(
                "nz",
                0.0,
                "productivity grid needs at least one state",
            ));
        }
        if !(self.eta > 0.0) || !self.eta.is_finite() {
            return Err(VfiError::invalid_parameter(
                "eta",
                self.eta,
                "must be positive and finite",
            ));
        }
        if self.eta == 1.0 {
            return Err(VfiError::invalid_parameter(
                "eta",
                self.eta,
                "logarithmic utility is not supported",
            ));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(VfiError::invalid_parameter(
                "beta",
                self.beta,
                "must lie in (0, 1)",
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(VfiError::invalid_parameter(
                "alpha",
                self.alpha,
                "must lie in (0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(VfiError::invalid_parameter(
                "delta",
                self.delta,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_selectors() {
        assert_eq!("grid".parse::<MaxType>().unwrap(), MaxType::Grid);
        assert_eq!("b".parse::<MaxType>().unwrap(), MaxType::Binary);
        assert_eq!(" Binary ".parse::<MaxType>().unwrap(), MaxType::Binary);
        let err = "golden".parse::<MaxType>().unwrap_err();
        assert!(matches!(err, VfiError::InvalidMaxType { ref value } if value == "golden"));
    }

    #[test]
    fn default_calibration_is_valid() {
        Parameters::default().validate().unwrap();
    }

    #[test]
    fn rejects_log_utility_and_bad_discounting() {
        let log = Parameters::default().with_eta(1.0);
        assert!(matches!(
            log.validate(),
            Err(VfiError::InvalidParameter { name: "eta", .. })
        ));

        let patient = Parameters::default().with_beta(1.0);
        assert!(matches!(
            patient.validate(),
            Err(VfiError::InvalidParameter { name: "beta", .. })
        ));

        let empty = Parameters::default().with_dimensions(0, 3);
        assert!(matches!(
            empty.validate(),
            Err(VfiError::InvalidParameter { name: "nk", .. })
        ));
    }

    #[test]
    fn deserializes_from_json_configuration() {
        let json = r#"{
            "nk": 25, "nz": 2, "eta": 2.0, "beta": 0.95,
            "alpha": 0.3, "delta": 0.1, "maxtype": "grid"
        }"#;
        let params: Parameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.maxtype, MaxType::Grid);
        assert_eq!(params.nk, 25);
        params.validate().unwrap();
        assert_eq!(params.maxtype.maximizer().name(), "grid");
    }
}
