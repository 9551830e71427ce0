//! Compactified spectral grid: maps between the Chebyshev-Lobatto
//! coordinates `(chi, rho_z, rho_perp)` used for spectral differentiation
//! and integration, and the physical coordinates `(xi, p_z, p_perp)`.

use ndarray::Array1;

use crate::cheb;
use crate::error::{GridError, Result};

/// Compactified spectral grid with three independent length scales: the
/// spatial tail length(s) `L_xi` (or `L_+`/`L_-` in the 3-scales variant)
/// and the momentum falloff scale `T_ref`.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Number of spatial basis points. Yields `M - 1` interior points.
    m: usize,
    /// Odd momentum basis size. Yields `N - 1` interior points.
    n: usize,
    /// Tail length on the `chi > wall_center` side (or the single scale in
    /// the symmetric variant).
    l_plus: f64,
    /// Tail length on the `chi < wall_center` side. Equal to `l_plus` in
    /// the symmetric variant.
    l_minus: f64,
    /// Width of the smooth blend region between the two tail scales.
    l_wall: f64,
    /// Steepness of the blend, relative to `l_wall`.
    ratio: f64,
    /// Compactified coordinate at which the two tail scales are centered.
    wall_center: f64,
    /// Momentum falloff scale `T_ref`. Mutable in place between solves via
    /// [`Grid::change_momentum_falloff_scale`].
    t_ref: f64,
    three_scales: bool,
}

impl Grid {
    /// Single-scale ("symmetric") grid: `xi = L_xi * atanh(chi)`.
    pub fn new_symmetric(m: usize, n: usize, l_xi: f64, t_ref: f64) -> Result<Self> {
        Self::new_three_scales(m, n, l_xi, l_xi, l_xi, 1.0, 0.0, t_ref)
    }

    /// Three-scales grid with a smooth blend between `l_plus` and `l_minus`
    /// through `wall_center`, of width `l_wall` and steepness `ratio`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_three_scales(
        m: usize,
        n: usize,
        l_plus: f64,
        l_minus: f64,
        l_wall: f64,
        ratio: f64,
        wall_center: f64,
        t_ref: f64,
    ) -> Result<Self> {
        if n % 2 == 0 {
            return Err(GridError::EvenMomentumGridSize { n });
        }
        if m < 2 {
            return Err(GridError::SpatialGridTooSmall { m });
        }
        for (name, value) in [
            ("L_plus", l_plus),
            ("L_minus", l_minus),
            ("L_wall", l_wall),
            ("T_ref", t_ref),
        ] {
            if value <= 0.0 {
                return Err(GridError::NonPositiveScale { name, value });
            }
        }
        Ok(Self {
            m,
            n,
            l_plus,
            l_minus,
            l_wall,
            ratio,
            wall_center,
            t_ref,
            three_scales: (l_plus - l_minus).abs() > 1e-15,
        })
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn t_ref(&self) -> f64 {
        self.t_ref
    }

    pub fn wall_center(&self) -> f64 {
        self.wall_center
    }

    pub fn is_three_scales(&self) -> bool {
        self.three_scales
    }

    /// Changes the momentum falloff scale in place. Only meaningful between
    /// solves: any [`crate::Polynomial`] built on the previous scale becomes
    /// stale (its physical-space images no longer match).
    pub fn change_momentum_falloff_scale(&mut self, new_t_ref: f64) -> Result<()> {
        if new_t_ref <= 0.0 {
            return Err(GridError::NonPositiveScale {
                name: "T_ref",
                value: new_t_ref,
            });
        }
        self.t_ref = new_t_ref;
        Ok(())
    }

    // ---- Chebyshev-Lobatto node arrays ------------------------------------

    pub fn chi_full(&self) -> Array1<f64> {
        cheb::lobatto_nodes(self.m)
    }

    pub fn chi_interior(&self) -> Array1<f64> {
        cheb::lobatto_nodes_interior(self.m)
    }

    pub fn rho_z_full(&self) -> Array1<f64> {
        cheb::lobatto_nodes(self.n)
    }

    pub fn rho_z_interior(&self) -> Array1<f64> {
        cheb::lobatto_nodes_interior(self.n)
    }

    pub fn rho_perp_full(&self) -> Array1<f64> {
        cheb::lobatto_nodes(self.n)
    }

    pub fn rho_perp_interior(&self) -> Array1<f64> {
        cheb::lobatto_nodes_interior(self.n)
    }

    // ---- Physical-space maps and Jacobians --------------------------------

    /// Smooth tail-scale blend `L(chi)`, constant equal to `l_plus` in the
    /// symmetric variant.
    fn length_scale(&self, chi: f64) -> f64 {
        if !self.three_scales {
            return self.l_plus;
        }
        let blend_width = self.l_wall / self.ratio;
        let s = 0.5 * (1.0 + ((chi - self.wall_center) / blend_width).tanh());
        self.l_minus + (self.l_plus - self.l_minus) * s
    }

    fn length_scale_derivative(&self, chi: f64) -> f64 {
        if !self.three_scales {
            return 0.0;
        }
        let blend_width = self.l_wall / self.ratio;
        let t = ((chi - self.wall_center) / blend_width).tanh();
        let ds_dchi = 0.5 * (1.0 - t * t) / blend_width;
        (self.l_plus - self.l_minus) * ds_dchi
    }

    /// `xi(chi) = L(chi) * atanh(chi)`, defined on the open interval `(-1, 1)`.
    pub fn xi_of_chi(&self, chi: f64) -> f64 {
        self.length_scale(chi) * chi.atanh()
    }

    /// `d(xi)/d(chi)`, strictly positive on `(-1, 1)`.
    pub fn dxi_dchi(&self, chi: f64) -> f64 {
        let l = self.length_scale(chi);
        let dl = self.length_scale_derivative(chi);
        dl * chi.atanh() + l / (1.0 - chi * chi)
    }

    /// `p_z(rho_z) = T_ref * atanh(rho_z)`.
    pub fn pz_of_rho(&self, rho: f64) -> f64 {
        self.t_ref * rho.atanh()
    }

    /// `d(p_z)/d(rho_z)`, strictly positive on `(-1, 1)`.
    pub fn dpz_drho(&self, rho: f64) -> f64 {
        self.t_ref / (1.0 - rho * rho)
    }

    /// `p_perp(rho_perp) = -T_ref * ln((1 - rho_perp) / 2)`.
    pub fn pperp_of_rho(&self, rho: f64) -> f64 {
        -self.t_ref * ((1.0 - rho) / 2.0).ln()
    }

    /// `d(p_perp)/d(rho_perp)`, strictly positive on `(-1, 1)`.
    pub fn dpperp_drho(&self, rho: f64) -> f64 {
        self.t_ref / (1.0 - rho)
    }

    /// Physical images of the interior spatial nodes.
    pub fn xi_values(&self) -> Array1<f64> {
        self.chi_interior().mapv(|chi| self.xi_of_chi(chi))
    }

    /// Physical images of the interior `p_z` nodes.
    pub fn pz_values(&self) -> Array1<f64> {
        self.rho_z_interior().mapv(|rho| self.pz_of_rho(rho))
    }

    /// Physical images of the interior `p_perp` nodes.
    pub fn pperp_values(&self) -> Array1<f64> {
        self.rho_perp_interior().mapv(|rho| self.pperp_of_rho(rho))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_even_momentum_grid() {
        let err = Grid::new_symmetric(20, 10, 5.0, 1.0).unwrap_err();
        assert!(matches!(err, GridError::EvenMomentumGridSize { n: 10 }));
    }

    #[test]
    fn jacobians_are_positive_on_interior() {
        let grid = Grid::new_symmetric(20, 11, 5.0, 1.0).unwrap();
        for chi in grid.chi_interior().iter() {
            assert!(grid.dxi_dchi(*chi) > 0.0);
        }
        for rho in grid.rho_z_interior().iter() {
            assert!(grid.dpz_drho(*rho) > 0.0);
            assert!(grid.dpperp_drho(*rho) > 0.0);
        }
    }

    #[test]
    fn three_scales_jacobian_stays_positive() {
        let grid = Grid::new_three_scales(40, 11, 8.0, 2.0, 0.2, 4.0, 0.1, 1.0).unwrap();
        for chi in grid.chi_interior().iter() {
            assert!(
                grid.dxi_dchi(*chi) > 0.0,
                "dxi/dchi not positive at chi={chi}"
            );
        }
    }

    #[test]
    fn change_momentum_falloff_scale_mutates_in_place() {
        let mut grid = Grid::new_symmetric(10, 11, 5.0, 1.0).unwrap();
        grid.change_momentum_falloff_scale(2.0).unwrap();
        assert_eq!(grid.t_ref(), 2.0);
        assert!(grid.change_momentum_falloff_scale(-1.0).is_err());
    }
}
