use thiserror::Error;

/// Unified error type for `vfistep` operations.
///
/// Every variant is raised at the entry boundary of a step, before any cell
/// of the output matrices is written.
#[derive(Debug, Error)]
pub enum VfiError {
    /// Raised when provided grids or matrices have incompatible dimensions.
    #[error("dimension mismatch in {context}: expected {expected} but found {found}")]
    DimensionMismatch {
        /// Human-readable context describing the operation.
        context: &'static str,
        /// The required dimension, usually `nk` or `nz`.
        expected: usize,
        /// The dimension that was actually supplied.
        found: usize,
    },

    /// Raised when the maximization selector is not a recognized strategy.
    #[error("unrecognized maximization type `{value}`; expected `grid` or `binary`")]
    InvalidMaxType { value: String },

    /// Raised when a scalar parameter lies outside its admissible range.
    #[error("parameter `{name}` = {value} is invalid: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Raised when the capital grid is not strictly increasing and finite.
    #[error("capital grid must be finite and strictly increasing; violated at index {index}")]
    UnsortedGrid { index: usize },

    /// Raised when a transition row has a negative entry or does not sum to one.
    #[error("transition row {row} is not a probability distribution (slack {slack})")]
    InvalidTransitionRow { row: usize, slack: f64 },

    /// Raised when resources fall below the smallest capital grid point.
    #[error(
        "resources {resources} at cell ({capital_index}, {productivity_index}) fall below the capital grid floor {floor}"
    )]
    ResourceBelowGrid {
        capital_index: usize,
        productivity_index: usize,
        resources: f64,
        floor: f64,
    },

    /// Raised when a stored policy index does not point into the capital grid.
    #[error("policy index {index} at cell ({capital_index}, {productivity_index}) is outside the capital grid")]
    PolicyOutOfRange {
        capital_index: usize,
        productivity_index: usize,
        index: usize,
    },

    /// Raised when a stored policy choice exceeds the resources of its cell.
    #[error(
        "policy index {index} at cell ({capital_index}, {productivity_index}) implies negative consumption"
    )]
    InfeasiblePolicy {
        capital_index: usize,
        productivity_index: usize,
        index: usize,
    },

    /// Raised when a required input has not been provided.
    #[error("{component} must be provided for this step")]
    MissingComponent { component: &'static str },
}

impl VfiError {
    /// Helper to format a [`DimensionMismatch`](VfiError::DimensionMismatch) error.
    pub fn dimension_mismatch(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }

    /// Helper for bubbling up missing inputs.
    pub fn missing_component(component: &'static str) -> Self {
        Self::MissingComponent { component }
    }

    /// Helper for parameters outside their admissible range.
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Type alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, VfiError>;
