//! Maximization of the Bellman right-hand side over a feasible range of capital choices.
//!
//! Both strategies see the same [`Candidates`]: a contiguous range of grid
//! indices starting at `klo` together with precomputed continuation values.
//! [`GridMaximizer`] scans every candidate; [`BinaryMaximizer`] bisects on
//! the sign of the first difference, which is exact when the return
//! sequence is strictly concave in the index and may differ otherwise.

use nalgebra::DVector;

use crate::utility::crra;

/// Feasible choices for one grid cell and the data needed to value them.
#[derive(Clone, Copy, Debug)]
pub struct Candidates<'a> {
    /// Grid index of the first candidate.
    pub klo: usize,
    /// Resources available for consumption and saving.
    pub resources: f64,
    /// Utility curvature.
    pub eta: f64,
    /// Discount factor.
    pub beta: f64,
    /// Full capital grid.
    pub capital: &'a DVector<f64>,
    /// Expected continuation values, one per candidate.
    pub continuation: &'a DVector<f64>,
}

impl<'a> Candidates<'a> {
    /// Number of candidates (`khi - klo + 1`).
    pub fn len(&self) -> usize {
        self.continuation.len()
    }

    /// Returns `true` when no choice is feasible.
    pub fn is_empty(&self) -> bool {
        self.continuation.is_empty()
    }

    /// One-period return of the candidate at `offset` positions past `klo`.
    #[inline]
    pub fn value_at(&self, offset: usize) -> f64 {
        let k = self.klo + offset;
        crra(self.resources - self.capital[k], self.eta) + self.beta * self.continuation[offset]
    }
}

/// Best value found and the grid index attaining it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Maximum {
    /// Maximized right-hand side of the Bellman equation.
    pub value: f64,
    /// Grid index of the optimal next-period capital.
    pub index: usize,
    /// Number of return evaluations performed.
    pub evaluations: usize,
}

/// A strategy for locating the maximizing candidate.
pub trait Maximizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the best candidate. Ties resolve toward the lowest index.
    ///
    /// `candidates` must be non-empty.
    fn maximize(&self, candidates: &Candidates<'_>) -> Maximum;
}

/// Evaluates every candidate. `O(nksub)` and correct for any return shape.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridMaximizer;

impl Maximizer for GridMaximizer {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn maximize(&self, candidates: &Candidates<'_>) -> Maximum {
        debug_assert!(!candidates.is_empty());
        let mut best = scan(candidates, 0, candidates.len() - 1);
        best.index += candidates.klo;
        best
    }
}

/// Bisection on the first difference of a concave return sequence.
///
/// Each step compares two adjacent candidates and discards the half that
/// cannot contain the peak, so `O(log nksub)` evaluations suffice. The last
/// (at most three) candidates are scanned directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryMaximizer;

impl Maximizer for BinaryMaximizer {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn maximize(&self, candidates: &Candidates<'_>) -> Maximum {
        debug_assert!(!candidates.is_empty());
        let mut lo = 0usize;
        let mut hi = candidates.len() - 1;
        let mut evaluations = 0usize;

        while hi - lo > 2 {
            let left = lo + (hi - lo) / 2;
            let right = left + 1;
            let rising = candidates.value_at(left) < candidates.value_at(right);
            evaluations += 2;
            if rising {
                lo = right;
            } else {
                // Ties keep `left` so the lowest maximizing index survives.
                hi = left;
            }
        }

        let mut best = scan(candidates, lo, hi);
        best.index += candidates.klo;
        best.evaluations += evaluations;
        best
    }
}

/// Scans offsets `lo..=hi`, keeping the first strict maximum.
fn scan(candidates: &Candidates<'_>, lo: usize, hi: usize) -> Maximum {
    let mut best = Maximum {
        value: f64::NEG_INFINITY,
        index: lo,
        evaluations: 0,
    };
    for offset in lo..=hi {
        let value = candidates.value_at(offset);
        best.evaluations += 1;
        if offset == lo || value > best.value {
            best.value = value;
            best.index = offset;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_grid(n: usize) -> DVector<f64> {
        DVector::from_fn(n, |i, _| 0.5 + 0.1 * i as f64)
    }

    #[test]
    fn grid_scan_finds_interior_peak() {
        let capital = linear_grid(10);
        let continuation = DVector::from_fn(8, |i, _| -((i as f64) - 5.0).powi(2));
        let candidates = Candidates {
            klo: 2,
            resources: 2.0,
            eta: 2.0,
            beta: 0.9,
            capital: &capital,
            continuation: &continuation,
        };
        let best = GridMaximizer.maximize(&candidates);
        assert_eq!(best.evaluations, 8);
        let brute = (0..8)
            .map(|o| (candidates.value_at(o), o + 2))
            .fold((f64::NEG_INFINITY, 0), |acc, x| if x.0 > acc.0 { x } else { acc });
        assert_eq!((best.value, best.index), brute);
    }

    #[test]
    fn grid_ties_resolve_to_lowest_index() {
        let capital = linear_grid(4);
        // Resources so large that utility differences vanish against continuation.
        let continuation = DVector::from_vec(vec![0.0, 5.0, 5.0, 1.0]);
        let candidates = Candidates {
            klo: 0,
            resources: 1e12,
            eta: 2.0,
            beta: 1.0,
            capital: &capital,
            continuation: &continuation,
        };
        // u(c) is -1/c ~ -1e-12 for every candidate; rounding makes the two
        // continuation ties exact.
        assert_eq!(GridMaximizer.maximize(&candidates).index, 1);
        assert_eq!(BinaryMaximizer.maximize(&candidates).index, 1);
    }

    #[test]
    fn binary_matches_grid_on_concave_returns_with_fewer_evaluations() {
        let capital = linear_grid(200);
        for peak in [0.0, 3.0, 57.5, 120.0, 199.0] {
            let continuation = DVector::from_fn(200, |i, _| -0.01 * ((i as f64) - peak).powi(2));
            let candidates = Candidates {
                klo: 0,
                resources: 25.0,
                eta: 2.0,
                beta: 0.95,
                capital: &capital,
                continuation: &continuation,
            };
            let grid = GridMaximizer.maximize(&candidates);
            let binary = BinaryMaximizer.maximize(&candidates);
            assert_eq!(grid.value, binary.value, "peak {peak}");
            assert_eq!(grid.index, binary.index, "peak {peak}");
            assert!(binary.evaluations < grid.evaluations / 4);
        }
    }

    #[test]
    fn single_candidate_is_returned_unchanged() {
        let capital = linear_grid(5);
        let continuation = DVector::from_vec(vec![3.0]);
        let candidates = Candidates {
            klo: 4,
            resources: 2.0,
            eta: 2.0,
            beta: 0.5,
            capital: &capital,
            continuation: &continuation,
        };
        for maximizer in [&GridMaximizer as &dyn Maximizer, &BinaryMaximizer] {
            let best = maximizer.maximize(&candidates);
            assert_eq!(best.index, 4);
            assert_eq!(best.value, candidates.value_at(0));
            assert_eq!(best.evaluations, 1);
        }
    }
}
