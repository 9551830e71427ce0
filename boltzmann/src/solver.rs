//! Ties particle descriptors, background and collision tensors together:
//! assembles one dense operator per out-of-equilibrium particle (in
//! parallel via `rayon`), solves it by dense LU, and extracts moments.

use std::collections::HashMap;

use nalgebra::DVector;
use rayon::prelude::*;
use wallspeed_collision::CollisionArray;

use crate::background::BoltzmannBackground;
use crate::error::{BoltzmannError, Result};
use crate::moments::{self, Moments};
use crate::operator;
use crate::particle::Particle;

/// Condition number above which the solve is flagged but not aborted.
pub const ILL_CONDITIONED_THRESHOLD: f64 = 1e12;

/// Result of solving one particle's Boltzmann equation.
pub struct ParticleSolution {
    pub particle_name: String,
    pub delta_f: DVector<f64>,
    pub moments: Moments,
    /// Set when the assembled operator's estimated condition number exceeds
    /// [`ILL_CONDITIONED_THRESHOLD`].
    pub ill_conditioned: Option<f64>,
}

pub struct BoltzmannSolver<'a> {
    background: &'a BoltzmannBackground,
}

impl<'a> BoltzmannSolver<'a> {
    pub fn new(background: &'a BoltzmannBackground) -> Self {
        Self { background }
    }

    /// Solves every off-equilibrium particle's operator, skipping particles
    /// marked `in_equilibrium`. `collisions` maps a particle name to its
    /// (already summed over partners) collision tensor.
    pub fn solve_all(
        &self,
        particles: &[Particle],
        collisions: &HashMap<String, CollisionArray>,
    ) -> Result<Vec<ParticleSolution>> {
        let grid = self.background.grid();
        particles
            .par_iter()
            .filter(|particle| !particle.in_equilibrium)
            .map(|particle| {
                let collision = collisions.get(&particle.name);
                let (matrix, source) = operator::assemble(self.background, particle, collision);

                let condition = estimate_condition_number(&matrix);
                let ill_conditioned = if condition > ILL_CONDITIONED_THRESHOLD {
                    tracing::warn!(
                        particle = %particle.name,
                        condition,
                        "Boltzmann operator is ill-conditioned"
                    );
                    Some(condition)
                } else {
                    None
                };

                let lu = matrix.lu();
                let delta_f = lu.solve(&source).ok_or_else(|| BoltzmannError::SingularOperator {
                    particle: particle.name.clone(),
                })?;

                let particle_moments = moments::extract(grid, &delta_f);
                Ok(ParticleSolution {
                    particle_name: particle.name.clone(),
                    delta_f,
                    moments: particle_moments,
                    ill_conditioned,
                })
            })
            .collect()
    }
}

/// `kappa = sigma_max / sigma_min` from the singular value spectrum.
fn estimate_condition_number(matrix: &nalgebra::DMatrix<f64>) -> f64 {
    let svd = matrix.clone().svd(false, false);
    let singular_values = svd.singular_values;
    let max = singular_values.iter().cloned().fold(0.0, f64::max);
    let min = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    if min <= 0.0 {
        f64::INFINITY
    } else {
        max / min
    }
}
