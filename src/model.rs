//! Validated grids and transition matrix for the stochastic growth model.

use nalgebra::{DMatrix, DVector};

use crate::bellman::{vf_step, StepOptions, StepSummary, SweepMode};
use crate::error::{Result, VfiError};
use crate::parameters::Parameters;
use crate::resources::resource_grid;

/// Discretized growth model: calibration, capital and productivity grids,
/// and the productivity transition matrix.
///
/// Construction goes through [`GrowthModelBuilder`], which enforces the
/// sizes implied by `nk`/`nz`, a strictly increasing capital grid and a
/// row-stochastic transition matrix.
#[derive(Clone, Debug)]
pub struct GrowthModel {
    params: Parameters,
    capital: DVector<f64>,
    productivity: DVector<f64>,
    transitions: DMatrix<f64>,
}

impl GrowthModel {
    /// Start building a model from its calibration.
    pub fn builder(params: Parameters) -> GrowthModelBuilder {
        GrowthModelBuilder::new(params)
    }

    /// Calibration.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Capital grid `K`, strictly increasing.
    pub fn capital(&self) -> &DVector<f64> {
        &self.capital
    }

    /// Productivity grid `Z`.
    pub fn productivity(&self) -> &DVector<f64> {
        &self.productivity
    }

    /// Transition matrix `P`; row `j` is the distribution of next-period productivity.
    pub fn transitions(&self) -> &DMatrix<f64> {
        &self.transitions
    }

    /// Resources `ydepK` at every (capital, productivity) cell.
    pub fn resources(&self) -> DMatrix<f64> {
        resource_grid(
            &self.capital,
            &self.productivity,
            self.params.alpha,
            self.params.delta,
        )
    }

    /// Runs one step into freshly allocated buffers.
    ///
    /// `policy` seeds the stored decision rule; it defaults to all zeros
    /// for [`SweepMode::Maximize`]. [`SweepMode::Evaluate`] without a
    /// policy fails with [`VfiError::MissingComponent`].
    pub fn step(
        &self,
        mode: SweepMode,
        v0: &DMatrix<f64>,
        policy: Option<&DMatrix<usize>>,
    ) -> Result<(DMatrix<f64>, DMatrix<usize>, StepSummary)> {
        let (nk, nz) = (self.params.nk, self.params.nz);
        let mut policy = match (policy, mode) {
            (Some(policy), _) => policy.clone(),
            (None, SweepMode::Maximize) => DMatrix::zeros(nk, nz),
            (None, SweepMode::Evaluate) => {
                return Err(VfiError::missing_component("policy function"))
            }
        };
        let mut v = DMatrix::zeros(nk, nz);
        let summary = self.step_into(mode, &StepOptions::default(), v0, &mut v, &mut policy)?;
        Ok((v, policy, summary))
    }

    /// Runs one step into caller-owned buffers. See [`vf_step`].
    pub fn step_into(
        &self,
        mode: SweepMode,
        options: &StepOptions,
        v0: &DMatrix<f64>,
        v: &mut DMatrix<f64>,
        policy: &mut DMatrix<usize>,
    ) -> Result<StepSummary> {
        vf_step(self, mode, options, v0, v, policy)
    }
}

/// Builder that validates dimensions and grid structure before constructing [`GrowthModel`].
#[derive(Debug)]
pub struct GrowthModelBuilder {
    params: Parameters,
    capital: Option<DVector<f64>>,
    productivity: Option<DVector<f64>>,
    transitions: Option<DMatrix<f64>>,
}

impl GrowthModelBuilder {
    /// Start building a model from its calibration.
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            capital: None,
            productivity: None,
            transitions: None,
        }
    }

    /// Sets the capital grid `K`.
    pub fn capital(mut self, grid: DVector<f64>) -> Self {
        self.capital = Some(grid);
        self
    }

    /// Sets the productivity grid `Z`.
    pub fn productivity(mut self, grid: DVector<f64>) -> Self {
        self.productivity = Some(grid);
        self
    }

    /// Sets the transition matrix `P`.
    pub fn transitions(mut self, matrix: DMatrix<f64>) -> Self {
        self.transitions = Some(matrix);
        self
    }

    /// Finalizes construction after validating parameters, shapes and ordering.
    pub fn build(self) -> Result<GrowthModel> {
        self.params.validate()?;
        let (nk, nz) = (self.params.nk, self.params.nz);

        let capital = self
            .capital
            .ok_or_else(|| VfiError::dimension_mismatch("capital grid", nk, 0))?;
        if capital.len() != nk {
            return Err(VfiError::dimension_mismatch(
                "capital grid",
                nk,
                capital.len(),
            ));
        }
        validate_increasing(&capital)?;

        let productivity = self
            .productivity
            .ok_or_else(|| VfiError::dimension_mismatch("productivity grid", nz, 0))?;
        if productivity.len() != nz {
            return Err(VfiError::dimension_mismatch(
                "productivity grid",
                nz,
                productivity.len(),
            ));
        }

        let transitions = self
            .transitions
            .ok_or_else(|| VfiError::dimension_mismatch("transition matrix", nz, 0))?;
        if transitions.nrows() != nz {
            return Err(VfiError::dimension_mismatch(
                "transition matrix rows",
                nz,
                transitions.nrows(),
            ));
        }
        if transitions.ncols() != nz {
            return Err(VfiError::dimension_mismatch(
                "transition matrix columns",
                nz,
                transitions.ncols(),
            ));
        }
        validate_stochastic(&transitions)?;

        Ok(GrowthModel {
            params: self.params,
            capital,
            productivity,
            transitions,
        })
    }
}

fn validate_increasing(capital: &DVector<f64>) -> Result<()> {
    for (index, value) in capital.iter().enumerate() {
        if !value.is_finite() {
            return Err(VfiError::UnsortedGrid { index });
        }
        if index > 0 && capital[index - 1] >= *value {
            return Err(VfiError::UnsortedGrid { index });
        }
    }
    Ok(())
}

fn validate_stochastic(transitions: &DMatrix<f64>) -> Result<()> {
    for (row, probabilities) in transitions.row_iter().enumerate() {
        if let Some(negative) = probabilities.iter().find(|p| !(**p >= 0.0)) {
            return Err(VfiError::InvalidTransitionRow {
                row,
                slack: *negative,
            });
        }
        let slack = (probabilities.sum() - 1.0).abs();
        if slack > 1e-8 {
            return Err(VfiError::InvalidTransitionRow { row, slack });
        }
    }
    Ok(())
}
