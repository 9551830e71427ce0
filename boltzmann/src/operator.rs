//! Assembly of the discrete linearized Boltzmann operator for one particle:
//! the Liouville, force and collision terms flattened into a dense matrix
//! acting on the flattened `delta f[i, j, k]` (spatial x p_z x p_perp).
//!
//! **Simplification note.** The intertwiner matrices `T_*` the operator
//! contracts against in the original tool move `delta f` between the
//! Cardinal and Chebyshev representations of the momentum axes
//! (`basisN = Chebyshev`); this assembly instead keeps every axis in the
//! Cardinal (nodal) basis throughout; the spectral differentiation
//! (`D_chi`, `D_rhoz`) is unaffected; see `DESIGN.md`. The interior
//! differentiation matrices themselves come from `wallspeed_grid::cheb`,
//! the same endpoint-flip machinery `Polynomial::derivative` uses, rather
//! than a private copy.

use nalgebra::{DMatrix, DVector};
use wallspeed_collision::CollisionArray;
use wallspeed_grid::cheb;

use crate::background::BoltzmannBackground;
use crate::particle::Particle;

/// Flattened index `(i, j, k) -> i*n*n + j*n + k` for a spatial-interior
/// count `m` and a shared momentum-interior count `n`.
fn flat(i: usize, j: usize, k: usize, n: usize) -> usize {
    (i * n + j) * n + k
}

/// Converts the grid's interior-to-interior differentiation matrix (shared
/// with `Polynomial::derivative`'s endpoint bookkeeping, see `grid::cheb`)
/// to the dense `nalgebra` type this module's flattened assembly uses.
fn interior_differentiation_matrix(degree: usize) -> DMatrix<f64> {
    let m = cheb::interior_differentiation_matrix(degree);
    DMatrix::from_fn(m.nrows(), m.ncols(), |a, b| m[[a, b]])
}

/// Assembles the dense operator `L` and source `S` for one particle.
/// `collision` is `None` for particles with no off-equilibrium collision
/// partner recorded (their collision contribution is then zero).
pub fn assemble(
    background: &BoltzmannBackground,
    particle: &Particle,
    collision: Option<&CollisionArray>,
) -> (DMatrix<f64>, DVector<f64>) {
    let grid = background.grid();
    let m = grid.m() - 1;
    let n = grid.n() - 1;
    let total = m * n * n;

    let d_chi = interior_differentiation_matrix(grid.m());
    let d_rhoz = interior_differentiation_matrix(grid.n());

    let chi_nodes = grid.chi_interior();
    let rho_z = grid.rho_z_interior();
    let pz = grid.pz_values();
    let pperp = grid.pperp_values();

    let gamma_wall = background.gamma_wall();
    let v_wall = background.velocity_wall();

    let dxi_dchi: Vec<f64> = chi_nodes.iter().map(|&chi| grid.dxi_dchi(chi)).collect();
    let dpz_drho: Vec<f64> = rho_z.iter().map(|&rho| grid.dpz_drho(rho)).collect();

    let m_sq_total: Vec<f64> = (0..m)
        .map(|i| particle.m_sq_total(&background.fields_at(i), background.temperature_at(i)))
        .collect();
    // Numerical d(m^2)/d(chi) from the interior-restricted spectral
    // differentiation matrix, consistent with how D_chi differentiates
    // delta f itself.
    let dm2_dchi = &d_chi * DVector::from_vec(m_sq_total.clone());

    // P[i,j,k] and E[i,j,k], plus f_eq at every node for the source term.
    let mut energy = vec![0.0; total];
    let mut p_wall = vec![0.0; total];
    let mut f_eq = vec![0.0; total];
    for i in 0..m {
        let t = background.temperature_at(i);
        for j in 0..n {
            for k in 0..n {
                let idx = flat(i, j, k, n);
                let e = (pz[j].powi(2) + pperp[k].powi(2) + m_sq_total[i]).max(0.0).sqrt();
                energy[idx] = e;
                p_wall[idx] = gamma_wall * (pz[j] - v_wall * e);
                f_eq[idx] = particle.statistics.equilibrium(e / t);
            }
        }
    }

    // d(f_eq)/d(chi), lane-wise through D_chi (same structure as the
    // Liouville term's spatial derivative).
    let mut d_feq_dchi = vec![0.0; total];
    for j in 0..n {
        for k in 0..n {
            let lane: Vec<f64> = (0..m).map(|i| f_eq[flat(i, j, k, n)]).collect();
            let differentiated = &d_chi * DVector::from_vec(lane);
            for i in 0..m {
                d_feq_dchi[flat(i, j, k, n)] = differentiated[i];
            }
        }
    }

    let mut operator = DMatrix::<f64>::zeros(total, total);
    let mut source = DVector::<f64>::zeros(total);

    for i in 0..m {
        for j in 0..n {
            for k in 0..n {
                let row = flat(i, j, k, n);
                source[row] = -p_wall[row] * d_feq_dchi[row];

                // Liouville: dchi/dxi * P * D_chi (identity on rho_z, rho_perp).
                for a in 0..m {
                    let col = flat(a, j, k, n);
                    operator[(row, col)] += dxi_dchi[i] * p_wall[row] * d_chi[(i, a)];
                }

                // Force: -dchi/dxi * dpz/drho * 1/2 gamma_w * d(m^2)/dchi * D_rhoz
                // (identity on chi, rho_perp).
                let force_prefactor =
                    -dxi_dchi[i] * dpz_drho[j] * 0.5 * gamma_wall * dm2_dchi[i];
                for b in 0..n {
                    let col = flat(i, b, k, n);
                    operator[(row, col)] += force_prefactor * d_rhoz[(j, b)];
                }

                // Collision: T^2 * C[j,k,b,c] / P[i,j,k], diagonal in chi
                // (the collision integral is local to a spatial point).
                // The stored tensor has T^2 factored out at production
                // time, so it is rescaled back here.
                if let Some(collision) = collision {
                    let data = collision.polynomial().data();
                    let t_sq = background.temperature_at(i).powi(2);
                    for b in 0..n {
                        for c in 0..n {
                            let col = flat(i, b, c, n);
                            operator[(row, col)] += t_sq * data[[j, k, b, c]] / p_wall[row];
                        }
                    }
                }
            }
        }
    }

    (operator, source)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::particle::Statistics;
    use std::sync::Arc;

    fn toy_background() -> BoltzmannBackground {
        let grid = Arc::new(Grid::new_symmetric(6, 5, 5.0, 1.0).unwrap());
        let m = grid.m() - 1;
        let fields = ndarray::Array2::zeros((1, m));
        let temps = vec![100.0; m];
        BoltzmannBackground::new(grid, 0.4, fields, temps)
    }

    use wallspeed_grid::Grid;

    #[test]
    fn assembled_operator_has_expected_flattened_size() {
        let background = toy_background();
        let particle = Particle::new(
            "top",
            Statistics::FermiDirac,
            false,
            false,
            12.0,
            |_fields: &[f64]| 0.0,
            |_fields: &[f64]| vec![0.0],
            |_t: f64| 0.0,
        );
        let (operator, source) = assemble(&background, &particle, None);
        let m = background.grid().m() - 1;
        let n = background.grid().n() - 1;
        let total = m * n * n;
        assert_eq!(operator.nrows(), total);
        assert_eq!(operator.ncols(), total);
        assert_eq!(source.len(), total);
    }
}
