//! Derivative-free Nelder-Mead simplex minimization (Nelder & Mead 1965),
//! used as the default unconstrained minimizer wherever a potential or
//! model does not supply its own.

use nalgebra::DVector;

use crate::error::{NumericsError, Result};

const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Minimizes `f` starting from `x0`, stopping when the simplex's function
/// values spread by less than `tol` or after `max_iter` iterations.
/// Returns `(argmin, min_value)`.
pub fn minimize<F>(mut f: F, x0: &[f64], tol: f64, max_iter: usize) -> Result<(Vec<f64>, f64)>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    let mut simplex: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    simplex.push(DVector::from_row_slice(x0));
    for i in 0..n {
        let mut v = DVector::from_row_slice(x0);
        let step = if v[i].abs() > 1e-8 { 0.05 * v[i] } else { 0.00025 };
        v[i] += step;
        simplex.push(v);
    }

    let mut values: Vec<f64> = simplex.iter().map(|x| f(x.as_slice())).collect();

    for _ in 0..max_iter {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());
        let simplex_sorted: Vec<DVector<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let values_sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = simplex_sorted;
        values = values_sorted;

        let spread = values[n] - values[0];
        if spread.abs() < tol {
            return Ok((simplex[0].iter().copied().collect(), values[0]));
        }

        let centroid: DVector<f64> =
            simplex[..n].iter().fold(DVector::zeros(n), |acc, x| acc + x) / n as f64;

        let worst = &simplex[n];
        let reflected = &centroid + ALPHA * (&centroid - worst);
        let f_reflected = f(reflected.as_slice());

        if f_reflected < values[0] {
            let expanded = &centroid + GAMMA * (&reflected - &centroid);
            let f_expanded = f(expanded.as_slice());
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let contracted = &centroid + RHO * (worst - &centroid);
        let f_contracted = f(contracted.as_slice());
        if f_contracted < values[n] {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        for i in 1..=n {
            simplex[i] = &simplex[0] + SIGMA * (&simplex[i] - &simplex[0]);
            values[i] = f(simplex[i].as_slice());
        }
    }

    let spread = values.iter().cloned().fold(f64::MIN, f64::max)
        - values.iter().cloned().fold(f64::MAX, f64::min);
    Err(NumericsError::MinimizationNotConverged {
        max_iter,
        size: spread,
    })
}
