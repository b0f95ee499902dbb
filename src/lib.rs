//! Bellman update kernel for value-function iteration on the stochastic growth model.
//!
//! Given a current value function over a grid of capital stocks and
//! productivity states, [`vf_step`] produces the updated value function and
//! the updated savings policy. The crate covers one iteration only; the
//! convergence loop, grid construction and Markov-chain discretization
//! belong to the caller.
//!
//! The pieces, leaves first:
//!
//! - resources available next period (`resources` module),
//! - the feasibility bound from non-negative consumption (`feasibility` module),
//! - expected continuation values under the productivity chain (`continuation` module),
//! - exhaustive and concavity-exploiting maximizers (`maximize` module), and
//! - the orchestrating sweep with Howard policy evaluation (`bellman` module).
//!
//! # Quick start
//!
//! ```no_run
//! use vfistep::{GrowthModel, MaxType, Parameters, StepOptions, SweepMode};
//! use nalgebra::{DMatrix, DVector};
//!
//! let params = Parameters::default()
//!     .with_dimensions(200, 2)
//!     .with_maxtype(MaxType::Binary);
//! let capital = DVector::from_fn(200, |i, _| 10.0 + 0.5 * i as f64);
//! let productivity = DVector::from_vec(vec![0.95, 1.05]);
//! let transitions = DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.1, 0.9]);
//!
//! let model = GrowthModel::builder(params)
//!     .capital(capital)
//!     .productivity(productivity)
//!     .transitions(transitions)
//!     .build()
//!     .expect("validated model");
//!
//! let mut v0 = DMatrix::zeros(200, 2);
//! let mut v = DMatrix::zeros(200, 2);
//! let mut policy = DMatrix::zeros(200, 2);
//! let options = StepOptions::default();
//!
//! for iteration in 0..500 {
//!     // Three Howard sweeps between every maximization.
//!     let mode = SweepMode::from(iteration % 4 != 0);
//!     let summary = model
//!         .step_into(mode, &options, &v0, &mut v, &mut policy)
//!         .expect("well-formed step");
//!     std::mem::swap(&mut v0, &mut v);
//!     if mode == SweepMode::Maximize && summary.max_gap < 1e-8 {
//!         break;
//!     }
//! }
//! ```

pub mod bellman;
pub mod continuation;
pub mod error;
pub mod feasibility;
pub mod maximize;
pub mod model;
pub mod parameters;
pub mod resources;
pub mod utility;

pub use bellman::{vf_step, StepOptions, StepSummary, SweepMode};
pub use error::{Result, VfiError};
pub use maximize::{BinaryMaximizer, Candidates, GridMaximizer, Maximizer, Maximum};
pub use model::{GrowthModel, GrowthModelBuilder};
pub use parameters::{MaxType, Parameters};
