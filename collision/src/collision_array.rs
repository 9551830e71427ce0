//! The loaded, basis-transformed collision tensor for one pair of
//! out-of-equilibrium particles.

use std::path::Path;

use nalgebra::DMatrix;
use ndarray::Array4;
use wallspeed_grid::{AxisTag, Basis, Direction, Grid, Polynomial};

use crate::container::{self, RawContainer};
use crate::error::{CollisionError, Result};
use crate::resample::resample_axis;

/// Rank-4 collision kernel `C[pz, pperp, poly1, poly2]` for one ordered
/// pair of off-equilibrium particles. Momentum axes are always Cardinal;
/// the two polynomial axes share a single, caller-chosen basis.
pub struct CollisionArray {
    polynomial: Polynomial,
    particles: (String, String),
}

impl CollisionArray {
    /// Wraps an already-built rank-4 tensor, checking the axis-tag
    /// contract: momentum axes Cardinal, the two polynomial axes sharing
    /// one basis.
    pub fn from_polynomial(polynomial: Polynomial, particles: (String, String)) -> Result<Self> {
        if polynomial.rank() != 4 {
            return Err(CollisionError::RankMismatch {
                rank: polynomial.rank(),
            });
        }
        let axes = polynomial.axes();
        if axes[0].basis != Basis::Cardinal || axes[1].basis != Basis::Cardinal {
            return Err(CollisionError::Corrupt(
                "momentum axes of a CollisionArray must be in the Cardinal basis".into(),
            ));
        }
        if axes[2].basis != axes[3].basis {
            return Err(CollisionError::Corrupt(
                "the two polynomial axes of a CollisionArray must share one basis".into(),
            ));
        }
        Ok(Self {
            polynomial,
            particles,
        })
    }

    pub fn particles(&self) -> &(String, String) {
        &self.particles
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// Loads the tensor for `particles` from `path`, matched to `grid`'s
    /// momentum basis size `N - 1`. If the file's basis size is larger and
    /// `allow_interpolation` is set, resamples down onto the target grid;
    /// a smaller file basis size is always an error.
    pub fn load(
        path: &Path,
        grid: &Grid,
        particles: (String, String),
        allow_interpolation: bool,
    ) -> Result<Self> {
        let container = container::read_file(path)?;
        Self::from_container(container, grid, particles, allow_interpolation)
    }

    fn from_container(
        container: RawContainer,
        grid: &Grid,
        particles: (String, String),
        allow_interpolation: bool,
    ) -> Result<Self> {
        let n_target = grid.n() - 1;
        let n_file = container.basis_size - 1;

        let fixed = container::fix_axis_order(&container.data);

        let tags = |poly_basis: Basis| {
            vec![
                AxisTag::new(Basis::Cardinal, Direction::Pz, false),
                AxisTag::new(Basis::Cardinal, Direction::PPerp, false),
                AxisTag::new(poly_basis, Direction::Z, false),
                AxisTag::new(poly_basis, Direction::Z, false),
            ]
        };

        if n_file == n_target {
            let polynomial = Polynomial::new(fixed, tags(container.basis_type))?;
            return Self::from_polynomial(polynomial, particles);
        }

        if n_file < n_target {
            return Err(CollisionError::TargetGridLarger { n_file, n_target });
        }

        if !allow_interpolation {
            return Err(CollisionError::TargetGridLarger { n_file, n_target });
        }

        let mut resampled = fixed;
        for axis in 0..4 {
            resampled = resample_axis(&resampled, axis, n_file, n_target);
        }
        let polynomial = Polynomial::new(resampled, tags(container.basis_type))?;
        Self::from_polynomial(polynomial, particles)
    }

    /// Resamples this tensor onto a different target basis size.
    pub fn interpolate_to(&self, target_n: usize) -> Result<Self> {
        let current_n = self.polynomial.shape()[0] - 1;
        let mut data = self.polynomial.data().clone();
        for axis in 0..4 {
            data = resample_axis(&data, axis, current_n, target_n);
        }
        let axes = self.polynomial.axes().to_vec();
        let polynomial = Polynomial::new(data, axes)?;
        Self::from_polynomial(polynomial, self.particles.clone())
    }

    /// Writes this tensor back out in the on-disk axis convention.
    pub fn save(&self, path: &Path) -> Result<()> {
        let n = self.polynomial.shape()[0];
        let data = self.polynomial.data();
        let mut file_order = Array4::<f64>::zeros((n, n, n, n));
        for pz in 0..n {
            for pp in 0..n {
                for p1 in 0..n {
                    for p2 in 0..n {
                        file_order[[p1, p2, n - 1 - pz, n - 1 - pp]] = data[[pz, pp, p1, p2]];
                    }
                }
            }
        }
        let basis_type = self.polynomial.axes()[2].basis;
        container::write_file(
            path,
            &RawContainer {
                basis_size: n,
                basis_type,
                data: file_order,
            },
        )
    }

    /// Eigenvalue-based estimate of the collision decay length: builds
    /// `C / P_wall` as a square `(N-1)^2 x (N-1)^2` matrix pairing
    /// `(pz, pperp)` against `(poly1, poly2)`, and returns
    /// `1 / max(-Re(lambda))` over its eigenvalues.
    pub fn estimate_lxi(&self, grid: &Grid, v_wall: f64, temperature: f64, mass_sq: f64) -> Result<f64> {
        let data = self.polynomial.data();
        let n = data.shape()[0];
        let pz_nodes = grid.rho_z_interior();
        let pp_nodes = grid.rho_perp_interior();
        // momentum axes here are endpoint-excluded (N-1 points); fall back
        // to the full Lobatto set truncated if grid sizes differ.
        let pz_phys: Vec<f64> = (0..n)
            .map(|i| grid.pz_of_rho(*pz_nodes.get(i).unwrap_or(&0.0)))
            .collect();
        let pp_phys: Vec<f64> = (0..n)
            .map(|i| grid.pperp_of_rho(*pp_nodes.get(i).unwrap_or(&0.0)))
            .collect();

        let gamma = 1.0 / (1.0 - v_wall * v_wall).sqrt();
        let mut matrix = DMatrix::<f64>::zeros(n * n, n * n);
        for pz_idx in 0..n {
            for pp_idx in 0..n {
                let pz = pz_phys[pz_idx];
                let pp = pp_phys[pp_idx];
                let energy = (pz * pz + pp * pp + mass_sq).sqrt();
                let p_wall = gamma * (pz - v_wall * energy);
                let row = pz_idx * n + pp_idx;
                for p1 in 0..n {
                    for p2 in 0..n {
                        let col = p1 * n + p2;
                        // The stored tensor is dimensionless (T^2 factored
                        // out at production time); rescale back here.
                        matrix[(row, col)] = data[[pz_idx, pp_idx, p1, p2]] * temperature.powi(2) / p_wall;
                    }
                }
            }
        }

        let eigenvalues = matrix.complex_eigenvalues();
        let max_neg_real = eigenvalues
            .iter()
            .map(|z| -z.re)
            .fold(f64::MIN, f64::max);
        if max_neg_real <= 0.0 {
            return Ok(f64::INFINITY);
        }
        Ok(1.0 / max_neg_real)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array4;

    fn tags() -> Vec<AxisTag> {
        vec![
            AxisTag::new(Basis::Cardinal, Direction::Pz, false),
            AxisTag::new(Basis::Cardinal, Direction::PPerp, false),
            AxisTag::new(Basis::Cardinal, Direction::Z, false),
            AxisTag::new(Basis::Cardinal, Direction::Z, false),
        ]
    }

    #[test]
    fn from_polynomial_rejects_wrong_rank() {
        let data = ndarray::Array2::<f64>::zeros((3, 3)).into_dyn();
        let axes = vec![tags()[0], tags()[1]];
        let polynomial = Polynomial::new(data, axes).unwrap();
        let err = CollisionArray::from_polynomial(polynomial, ("a".into(), "b".into())).unwrap_err();
        assert!(matches!(err, CollisionError::RankMismatch { rank: 2 }));
    }

    #[test]
    fn save_and_load_round_trip_matches_original() {
        let n = 4;
        let data = Array4::from_shape_fn((n, n, n, n), |(i, j, k, l)| {
            (i + j + k + l) as f64
        })
        .into_dyn();
        let polynomial = Polynomial::new(data, tags()).unwrap();
        let array = CollisionArray::from_polynomial(polynomial, ("top".into(), "top".into())).unwrap();

        let dir = std::env::temp_dir().join("wallspeed_collision_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("top_top.bin");
        array.save(&path).unwrap();

        let grid = Grid::new_symmetric(10, (n + 1) as usize, 5.0, 1.0).unwrap();
        let loaded = CollisionArray::load(&path, &grid, ("top".into(), "top".into()), false).unwrap();
        for (a, b) in array.polynomial().data().iter().zip(loaded.polynomial().data().iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
