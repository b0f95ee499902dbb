//! One Bellman update over the full (capital, productivity) grid.
//!
//! For each productivity column the step scans capital in increasing order.
//! In [`SweepMode::Maximize`] every cell bounds the feasible choices with
//! [`feasibility_bound`], optionally tightens the lower end with the
//! previous row's optimal choice, computes continuation values and hands the
//! range to the configured [`Maximizer`]. In [`SweepMode::Evaluate`] the
//! stored policy is taken as given and only its value is recomputed.
//!
//! Columns are independent of each other, so they run on the rayon pool
//! when [`StepOptions::parallel`] is set. Within a column the monotonicity
//! hint makes rows sequential.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::continuation::{continuation_value_at, continuation_values};
use crate::error::{Result, VfiError};
use crate::feasibility::feasibility_bound;
use crate::maximize::{Candidates, Maximizer, Maximum};
use crate::model::GrowthModel;
use crate::resources::resource_grid;
use crate::utility::crra;

/// What a sweep does with the stored policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepMode {
    /// Search for the optimal choice and overwrite the policy.
    Maximize,
    /// Howard policy evaluation: value the stored policy without searching.
    Evaluate,
}

impl SweepMode {
    /// Returns `true` for policy-evaluation sweeps.
    pub fn is_howard(self) -> bool {
        matches!(self, SweepMode::Evaluate)
    }
}

impl From<bool> for SweepMode {
    /// `true` selects Howard policy evaluation.
    fn from(howard: bool) -> Self {
        if howard {
            SweepMode::Evaluate
        } else {
            SweepMode::Maximize
        }
    }
}

/// Execution knobs that do not change the model.
#[derive(Clone, Debug)]
pub struct StepOptions {
    /// Restrict each cell's search to choices at or above the previous row's optimum.
    pub monotonicity: bool,
    /// Process productivity columns on the rayon thread pool.
    pub parallel: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            monotonicity: true,
            parallel: true,
        }
    }
}

impl StepOptions {
    /// Enable or disable the monotone lower bound.
    pub fn with_monotonicity(mut self, monotonicity: bool) -> Self {
        self.monotonicity = monotonicity;
        self
    }

    /// Enable or disable column parallelism.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Diagnostics returned by a step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepSummary {
    /// Number of cells written.
    pub cells: usize,
    /// Supremum norm of `V - V0` over cells where the difference is defined.
    pub max_gap: f64,
    /// Number of one-period return evaluations.
    pub evaluations: usize,
}

impl StepSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            cells: self.cells + other.cells,
            max_gap: self.max_gap.max(other.max_gap),
            evaluations: self.evaluations + other.evaluations,
        }
    }
}

/// Performs one value-function iteration step.
///
/// Reads `v0`, writes every cell of `v` exactly once and, in
/// [`SweepMode::Maximize`], overwrites `policy` with the new argmax. All
/// shape and range checks run before the first cell is written, so an
/// error leaves `v` and `policy` untouched.
pub fn vf_step(
    model: &GrowthModel,
    mode: SweepMode,
    options: &StepOptions,
    v0: &DMatrix<f64>,
    v: &mut DMatrix<f64>,
    policy: &mut DMatrix<usize>,
) -> Result<StepSummary> {
    let params = model.params();
    let (nk, nz) = (params.nk, params.nz);
    check_shape("current value function", v0, nk, nz)?;
    check_shape("updated value function", v, nk, nz)?;
    check_shape("policy function", policy, nk, nz)?;

    let capital = model.capital();
    let ydepk = resource_grid(capital, model.productivity(), params.alpha, params.delta);
    check_resources(&ydepk, capital)?;
    if mode.is_howard() {
        check_policy(policy, &ydepk, capital)?;
    }

    let maximizer = params.maxtype.maximizer();
    let sweep = ColumnSweep {
        capital,
        transitions: model.transitions(),
        ydepk: &ydepk,
        v0,
        eta: params.eta,
        beta: params.beta,
        maximizer,
        mode,
        monotonicity: options.monotonicity,
    };

    let values = v.as_mut_slice();
    let policies = policy.as_mut_slice();
    let summary = if options.parallel {
        values
            .par_chunks_mut(nk)
            .zip(policies.par_chunks_mut(nk))
            .enumerate()
            .map(|(j, (v_col, g_col))| sweep.run(j, v_col, g_col))
            .reduce(StepSummary::default, StepSummary::merge)
    } else {
        values
            .chunks_mut(nk)
            .zip(policies.chunks_mut(nk))
            .enumerate()
            .map(|(j, (v_col, g_col))| sweep.run(j, v_col, g_col))
            .fold(StepSummary::default(), StepSummary::merge)
    };

    debug!(
        "{:?} sweep with {} maximizer: {} cells, {} evaluations, max gap {:e}",
        mode,
        maximizer.name(),
        summary.cells,
        summary.evaluations,
        summary.max_gap
    );
    Ok(summary)
}

/// Shared read-only state for sweeping one productivity column.
struct ColumnSweep<'a> {
    capital: &'a DVector<f64>,
    transitions: &'a DMatrix<f64>,
    ydepk: &'a DMatrix<f64>,
    v0: &'a DMatrix<f64>,
    eta: f64,
    beta: f64,
    maximizer: &'a dyn Maximizer,
    mode: SweepMode,
    monotonicity: bool,
}

impl<'a> ColumnSweep<'a> {
    /// Sweeps column `j` in increasing capital order.
    fn run(&self, j: usize, v_col: &mut [f64], g_col: &mut [usize]) -> StepSummary {
        let p_row = self.transitions.row(j).transpose();
        let mut summary = StepSummary::default();
        let mut hint = None;

        for (i, (value, choice)) in v_col.iter_mut().zip(g_col.iter_mut()).enumerate() {
            let resources = self.ydepk[(i, j)];
            let best = match self.mode {
                SweepMode::Maximize => {
                    let best = self.maximize_cell(resources, hint, &p_row);
                    *choice = best.index;
                    hint = self.monotonicity.then_some(best.index);
                    best
                }
                SweepMode::Evaluate => self.evaluate_cell(resources, *choice, &p_row),
            };
            *value = best.value;

            let gap = (best.value - self.v0[(i, j)]).abs();
            summary.max_gap = summary.max_gap.max(gap);
            summary.evaluations += best.evaluations;
            summary.cells += 1;
        }

        trace!(
            "column {j}: {} evaluations, max gap {:e}",
            summary.evaluations,
            summary.max_gap
        );
        summary
    }

    /// Searches `[klo, khi]` for the best next-period capital.
    ///
    /// `hint` is the optimal choice of the row below in the same column;
    /// the optimal policy is weakly increasing in capital so nothing below
    /// it needs to be searched.
    fn maximize_cell(
        &self,
        resources: f64,
        hint: Option<usize>,
        p_row: &DVector<f64>,
    ) -> Maximum {
        // Resources at or above K[0] are checked on entry.
        let khi = feasibility_bound(resources, self.capital).unwrap_or(0);
        let mut klo = 0;
        if let Some(previous) = hint {
            if previous > klo && previous < khi {
                klo = previous;
            }
        }

        let continuation = continuation_values(self.v0, klo, khi, p_row);
        let candidates = Candidates {
            klo,
            resources,
            eta: self.eta,
            beta: self.beta,
            capital: self.capital,
            continuation: &continuation,
        };
        self.maximizer.maximize(&candidates)
    }

    /// Values the stored choice `k` without searching.
    fn evaluate_cell(&self, resources: f64, k: usize, p_row: &DVector<f64>) -> Maximum {
        let continuation = continuation_value_at(self.v0, k, p_row);
        Maximum {
            value: crra(resources - self.capital[k], self.eta) + self.beta * continuation,
            index: k,
            evaluations: 1,
        }
    }
}

fn check_shape<T: nalgebra::Scalar>(
    context: &'static str,
    matrix: &DMatrix<T>,
    nk: usize,
    nz: usize,
) -> Result<()> {
    if matrix.nrows() != nk {
        return Err(VfiError::dimension_mismatch(context, nk, matrix.nrows()));
    }
    if matrix.ncols() != nz {
        return Err(VfiError::dimension_mismatch(context, nz, matrix.ncols()));
    }
    Ok(())
}

fn check_resources(ydepk: &DMatrix<f64>, capital: &DVector<f64>) -> Result<()> {
    let floor = capital[0];
    for j in 0..ydepk.ncols() {
        for i in 0..ydepk.nrows() {
            let resources = ydepk[(i, j)];
            // Negated comparison also rejects NaN.
            if !(resources >= floor) {
                return Err(VfiError::ResourceBelowGrid {
                    capital_index: i,
                    productivity_index: j,
                    resources,
                    floor,
                });
            }
        }
    }
    Ok(())
}

/// A stored policy must point into the grid and leave consumption non-negative.
fn check_policy(
    policy: &DMatrix<usize>,
    ydepk: &DMatrix<f64>,
    capital: &DVector<f64>,
) -> Result<()> {
    for j in 0..policy.ncols() {
        for i in 0..policy.nrows() {
            let index = policy[(i, j)];
            if index >= capital.len() {
                return Err(VfiError::PolicyOutOfRange {
                    capital_index: i,
                    productivity_index: j,
                    index,
                });
            }
            if capital[index] > ydepk[(i, j)] {
                return Err(VfiError::InfeasiblePolicy {
                    capital_index: i,
                    productivity_index: j,
                    index,
                });
            }
        }
    }
    Ok(())
}
