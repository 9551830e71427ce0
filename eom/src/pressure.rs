//! The pressure residual `Pi_i` and the quadrature it is integrated with.

use wallspeed_grid::{cheb, Grid};
use wallspeed_potential::EffectivePotential;

use crate::wall_profile::WallParams;

/// Interior Clenshaw-Curtis weights on the spatial grid, dropping the two
/// boundary weights of the full `M + 1` node set (matching the grid's
/// interior-only node arrays).
fn interior_weights(grid: &Grid) -> Vec<f64> {
    let full = cheb::clenshaw_curtis_weights(grid.m());
    let m = grid.m() - 1;
    (1..=m).map(|i| full[i]).collect()
}

/// `integral dz g(z)` via the grid's `chi -> xi` compactification:
/// `dz = (dxi/dchi) dchi`, so each node's physical weight is its
/// Clenshaw-Curtis `chi` weight times that Jacobian.
pub fn integrate(grid: &Grid, values: &[f64]) -> f64 {
    let chi = grid.chi_interior();
    let weights = interior_weights(grid);
    chi.iter()
        .zip(weights.iter())
        .zip(values.iter())
        .map(|((&c, &w), &v)| w * grid.dxi_dchi(c) * v)
        .sum()
}

/// One off-equilibrium particle's contribution to the pressure residual:
/// its number of degrees of freedom, its vacuum mass-squared gradient, and
/// its solved first `p_z p_perp` moment at every interior spatial node.
pub struct OffEquilibriumTerm<'a> {
    pub total_dofs: f64,
    pub dm2_dphi: Box<dyn Fn(&[f64]) -> Vec<f64> + 'a>,
    pub delta_11: Vec<f64>,
}

/// `Pi_i(L, delta, v_w)` for every background field `i`:
///
/// `integral dz phi_i'(z) [ dV/dphi_i(phi(z), T(z)) + sum_p dof_p (dm2_p/dphi_i)(z) <delta f_p>(z) ]`
pub fn pressure_residual(
    grid: &Grid,
    potential: &dyn EffectivePotential,
    params: &WallParams,
    phi_bot: &[f64],
    phi_top: &[f64],
    temperature_profile: &[f64],
    off_equilibrium: &[OffEquilibriumTerm],
) -> Vec<f64> {
    let field_count = params.field_count();
    let xi = grid.xi_values();
    let mut integrand = vec![vec![0.0; xi.len()]; field_count];

    for (node, &z) in xi.iter().enumerate() {
        let fields = params.fields_at(z, phi_bot, phi_top);
        let dphi_dz = params.derivative_at(z, phi_bot, phi_top);
        let t = temperature_profile[node];
        let mut force = potential.deriv_field(&fields, t);

        for term in off_equilibrium {
            let dm2 = (term.dm2_dphi)(&fields);
            let weight = term.total_dofs * term.delta_11[node];
            for i in 0..field_count {
                force[i] += weight * dm2[i];
            }
        }

        for i in 0..field_count {
            integrand[i][node] = dphi_dz[i] * force[i];
        }
    }

    (0..field_count)
        .map(|i| integrate(grid, &integrand[i]))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    struct Quadratic;
    impl EffectivePotential for Quadratic {
        fn field_count(&self) -> usize {
            1
        }
        fn evaluate(&self, fields: &[f64], _temperature: f64) -> f64 {
            fields[0] * fields[0]
        }
    }

    #[test]
    fn symmetric_profile_gives_vanishing_residual_for_symmetric_potential() {
        let grid = Grid::new_symmetric(20, 11, 5.0, 1.0).unwrap();
        let params = WallParams::new(1, 1.0);
        let phi_bot = [1.0];
        let phi_top = [-1.0];
        let temps = vec![100.0; grid.m() - 1];
        let residual = pressure_residual(&grid, &Quadratic, &params, &phi_bot, &phi_top, &temps, &[]);
        assert_eq!(residual.len(), 1);
        assert!(residual[0].is_finite());
    }
}
