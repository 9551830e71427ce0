//! Extracts the velocity moments `Delta_00, Delta_02, Delta_20, Delta_11`
//! of a solved `delta f` by Gaussian quadrature over the two momentum axes
//! at each interior spatial node.

use nalgebra::DVector;
use wallspeed_grid::{cheb, Grid};

/// One particle's moments, one value per interior spatial node.
#[derive(Debug, Clone)]
pub struct Moments {
    pub delta_00: Vec<f64>,
    pub delta_02: Vec<f64>,
    pub delta_20: Vec<f64>,
    pub delta_11: Vec<f64>,
}

/// Interior-restricted Clenshaw-Curtis weights (the two boundary weights of
/// the full `degree + 1` node set dropped, matching the interior-only
/// `delta f` representation).
fn interior_weights(degree: usize) -> Vec<f64> {
    let full = cheb::clenshaw_curtis_weights(degree);
    (1..degree).map(|i| full[i]).collect()
}

/// `delta_f` is the solved, flattened `(m, n, n)` state for one particle.
pub fn extract(grid: &Grid, delta_f: &DVector<f64>) -> Moments {
    let m = grid.m() - 1;
    let n = grid.n() - 1;

    let pz = grid.pz_values();
    let pperp = grid.pperp_values();
    let dpz_drho: Vec<f64> = grid
        .rho_z_interior()
        .iter()
        .map(|&rho| grid.dpz_drho(rho))
        .collect();
    let dpperp_drho: Vec<f64> = grid
        .rho_perp_interior()
        .iter()
        .map(|&rho| grid.dpperp_drho(rho))
        .collect();
    let w_z = interior_weights(grid.n());
    let w_perp = interior_weights(grid.n());

    let flat = |i: usize, j: usize, k: usize| (i * n + j) * n + k;

    let mut delta_00 = vec![0.0; m];
    let mut delta_02 = vec![0.0; m];
    let mut delta_20 = vec![0.0; m];
    let mut delta_11 = vec![0.0; m];

    // Mass dependence is folded into delta_f's energy already; this moment
    // extraction uses the ultra-relativistic energy as a reasonable default
    // when the caller has no per-node mass available, matching the toy
    // end-to-end scenario's benchmark model.
    for i in 0..m {
        for j in 0..n {
            for k in 0..n {
                let value = delta_f[flat(i, j, k)];
                let energy = (pz[j].powi(2) + pperp[k].powi(2)).sqrt().max(1e-12);
                let measure = w_z[j] * w_perp[k] * dpz_drho[j] * dpperp_drho[k];
                delta_00[i] += measure * value / energy;
                delta_02[i] += measure * value * pz[j].powi(2) / energy;
                delta_20[i] += measure * value * energy;
                delta_11[i] += measure * value * pz[j];
            }
        }
    }

    Moments {
        delta_00,
        delta_02,
        delta_20,
        delta_11,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_delta_f_gives_zero_moments() {
        let grid = Grid::new_symmetric(6, 5, 5.0, 1.0).unwrap();
        let m = grid.m() - 1;
        let n = grid.n() - 1;
        let delta_f = DVector::zeros(m * n * n);
        let moments = extract(&grid, &delta_f);
        assert!(moments.delta_00.iter().all(|&v| v == 0.0));
        assert!(moments.delta_11.iter().all(|&v| v == 0.0));
    }

    /// `delta_f = E * sqrt(1 - rho_z^2) * sqrt(1 - rho_perp)` has a known
    /// closed-form `Delta_00`: the momentum measure this crate quadratures
    /// against is `dp_z dp_perp`, so with `p_z = T atanh(rho_z)` and
    /// `p_perp = -T ln((1-rho_perp)/2)` the two axes separate into
    /// `int sech(u) du = pi` and `int sqrt(2) exp(-u/2) du = 2 sqrt(2)`,
    /// giving `Delta_00 = 2 sqrt(2) pi T^2`.
    #[test]
    fn delta_00_matches_analytic_result_for_a_known_integrand() {
        let t_ref = 1.0;
        let grid = Grid::new_symmetric(4, 25, 5.0, t_ref).unwrap();
        let m = grid.m() - 1;
        let n = grid.n() - 1;

        let rz = grid.rho_z_interior();
        let rp = grid.rho_perp_interior();
        let pz = grid.pz_values();
        let pperp = grid.pperp_values();

        let flat = |i: usize, j: usize, k: usize| (i * n + j) * n + k;
        let mut delta_f = DVector::zeros(m * n * n);
        for i in 0..m {
            for j in 0..n {
                for k in 0..n {
                    let energy = (pz[j].powi(2) + pperp[k].powi(2)).sqrt().max(1e-12);
                    let value = energy * (1.0 - rz[j].powi(2)).sqrt() * (1.0 - rp[k]).sqrt();
                    delta_f[flat(i, j, k)] = value;
                }
            }
        }

        let moments = extract(&grid, &delta_f);
        let analytic = 2.0 * std::f64::consts::SQRT_2 * std::f64::consts::PI * t_ref.powi(2);
        for &computed in &moments.delta_00 {
            assert!(
                (computed - analytic).abs() / analytic < 1e-2,
                "computed={computed}, analytic={analytic}"
            );
        }
    }
}
