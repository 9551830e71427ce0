//! Damped Levenberg-Marquardt least-squares minimization with a
//! finite-difference Jacobian, used to fit the wall-parameter ansatz
//! against the pressure residual.

use nalgebra::{DMatrix, DVector};

use crate::error::{NumericsError, Result};

/// Minimizes `0.5 * ||residual(x)||^2` starting from `x0`. Stops when the
/// relative decrease in cost falls below `tol` or after `max_iter` steps.
/// Returns `(argmin, final_cost)`.
pub fn fit<F>(mut residual: F, x0: &[f64], tol: f64, max_iter: usize) -> Result<(Vec<f64>, f64)>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let n = x0.len();
    let mut x = DVector::from_row_slice(x0);
    let mut r = DVector::from_vec(residual(x.as_slice()));
    let mut cost = 0.5 * r.dot(&r);
    let mut lambda = 1e-3;

    for _ in 0..max_iter {
        let jacobian = finite_difference_jacobian(&mut residual, &x, &r);
        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let jtr = &jt * &r;

        loop {
            let mut augmented = jtj.clone();
            for i in 0..n {
                augmented[(i, i)] += lambda * augmented[(i, i)].max(1e-12);
            }
            let step = match augmented.clone().lu().solve(&(-&jtr)) {
                Some(s) => s,
                None => {
                    lambda *= 10.0;
                    if lambda > 1e12 {
                        return Err(NumericsError::LevenbergMarquardtNotConverged {
                            max_iter,
                            cost,
                        });
                    }
                    continue;
                }
            };
            let trial = &x + &step;
            let trial_r = DVector::from_vec(residual(trial.as_slice()));
            let trial_cost = 0.5 * trial_r.dot(&trial_r);

            if trial_cost < cost {
                let relative_decrease = (cost - trial_cost) / cost.max(1e-300);
                x = trial;
                r = trial_r;
                cost = trial_cost;
                lambda = (lambda * 0.3).max(1e-12);
                if relative_decrease < tol {
                    return Ok((x.iter().copied().collect(), cost));
                }
                break;
            } else {
                lambda *= 10.0;
                if lambda > 1e12 {
                    return Ok((x.iter().copied().collect(), cost));
                }
            }
        }
    }

    Err(NumericsError::LevenbergMarquardtNotConverged { max_iter, cost })
}

fn finite_difference_jacobian<F>(residual: &mut F, x: &DVector<f64>, r0: &DVector<f64>) -> DMatrix<f64>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let n = x.len();
    let m = r0.len();
    let mut jacobian = DMatrix::<f64>::zeros(m, n);
    for j in 0..n {
        let h = 1e-6 * x[j].abs().max(1e-6);
        let mut xp = x.clone();
        xp[j] += h;
        let rp = DVector::from_vec(residual(xp.as_slice()));
        for i in 0..m {
            jacobian[(i, j)] = (rp[i] - r0[i]) / h;
        }
    }
    jacobian
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fits_linear_least_squares_exactly() {
        // residual(x) = [x0 - 3, x1 + 1]
        let residual = |x: &[f64]| vec![x[0] - 3.0, x[1] + 1.0];
        let (argmin, cost) = fit(residual, &[0.0, 0.0], 1e-12, 100).unwrap();
        assert!((argmin[0] - 3.0).abs() < 1e-6);
        assert!((argmin[1] + 1.0).abs() < 1e-6);
        assert!(cost < 1e-10);
    }
}
