//! Upper bound on next-period capital implied by non-negative consumption.

use nalgebra::DVector;

/// Returns the largest index `h` with `capital[h] <= resources`.
///
/// The grid must be strictly increasing. Bisection brackets `resources`
/// between two neighbouring grid points in `O(log nk)` comparisons; when
/// the bracket's lower end still exceeds `resources` the bound steps down
/// by one.
///
/// Returns `None` when `resources < capital[0]` (or the grid is empty).
/// Callers must guarantee resources never fall below the smallest grid
/// point; the Bellman step checks this for the whole resource grid before
/// scanning.
pub fn feasibility_bound(resources: f64, capital: &DVector<f64>) -> Option<usize> {
    let nk = capital.len();
    if nk == 0 {
        return None;
    }

    let mut lo = 0usize;
    let mut hi = nk - 1;
    if capital[hi] <= resources {
        return Some(hi);
    }
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if capital[mid] <= resources {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if capital[lo] > resources {
        lo.checked_sub(1)
    } else {
        Some(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> DVector<f64> {
        DVector::from_vec(vec![1.0, 2.0, 3.0, 5.0, 8.0])
    }

    #[test]
    fn finds_tightest_point_not_exceeding_resources() {
        let k = grid();
        assert_eq!(feasibility_bound(1.0, &k), Some(0));
        assert_eq!(feasibility_bound(1.5, &k), Some(0));
        assert_eq!(feasibility_bound(3.0, &k), Some(2));
        assert_eq!(feasibility_bound(7.99, &k), Some(3));
    }

    #[test]
    fn saturates_at_top_of_grid() {
        let k = grid();
        assert_eq!(feasibility_bound(8.0, &k), Some(4));
        assert_eq!(feasibility_bound(100.0, &k), Some(4));
    }

    #[test]
    fn below_grid_floor_has_no_feasible_point() {
        let k = grid();
        assert_eq!(feasibility_bound(0.5, &k), None);
        assert_eq!(feasibility_bound(1.0, &DVector::zeros(0)), None);
    }

    #[test]
    fn agrees_with_linear_scan() {
        let k = DVector::from_fn(37, |i, _| 0.1 + (i as f64).powf(1.3));
        let mut r = 0.1;
        while r < 120.0 {
            let expected = k.as_slice().iter().rposition(|&x| x <= r);
            assert_eq!(feasibility_bound(r, &k), expected, "resources {r}");
            r += 0.37;
        }
    }
}
