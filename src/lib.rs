//! Facade crate: wires phase thermodynamics, the hydrodynamic matching
//! engine, the Boltzmann solver and the equation-of-motion outer loop into
//! a single top-level call that produces a [`WallGoResults`].
//!
//! Per-component details (grid primitives, the effective-potential
//! contract, collision tensors, ...) live in their own crates; this one
//! only re-exports their public surfaces and adds the orchestration that
//! ties them together in the order the outer loop needs: thermodynamic
//! cache, then grid sizing, then the equation-of-motion solve.

pub mod error;

pub use error::{Error, Result};

pub use wallspeed_boltzmann::{
    BoltzmannBackground, BoltzmannSolver, Particle, ParticleSolution, Statistics,
};
pub use wallspeed_collision::CollisionArray;
pub use wallspeed_config::Config;
pub use wallspeed_eom::{EomSettings, EomSolver, EomState, WallGoResults, WallParams};
pub use wallspeed_grid::{AxisTag, Basis, Direction, Grid, Polynomial};
pub use wallspeed_hydrodynamics::{
    HydroBoundaries, Hydrodynamics, MatchingPoint, Thermodynamics, ThermodynamicsExtrapolate,
};
pub use wallspeed_potential::{EffectivePotential, FreeEnergy, FreeEnergyValue};

use std::collections::HashMap;
use std::sync::Arc;

/// Runs the full pipeline for one nucleation point: builds the
/// thermodynamic cache and Jouguet velocity, sizes the grid around the
/// nucleation temperature, and runs the equation-of-motion outer loop to
/// completion.
#[allow(clippy::too_many_arguments)]
pub fn solve_wall_velocity<P: EffectivePotential>(
    config: &Config,
    potential: &P,
    phase_high: Arc<FreeEnergy>,
    phase_low: Arc<FreeEnergy>,
    t_nucl: f64,
    phi_bot: Vec<f64>,
    phi_top: Vec<f64>,
    particles: Vec<Particle>,
    collisions: HashMap<String, CollisionArray>,
    include_offeq: bool,
) -> Result<WallGoResults> {
    let thermodynamics = Thermodynamics::new(phase_high, phase_low, t_nucl);
    let mut hydro = Hydrodynamics::new(
        thermodynamics,
        config.hydrodynamics.tmax,
        config.hydrodynamics.tmin,
        config.hydrodynamics.rel_tol,
        config.hydrodynamics.abs_tol,
    )?;

    let grid = Arc::new(Grid::new_symmetric(
        config.polynomial_grid.spatial_grid_size,
        config.polynomial_grid.momentum_grid_size,
        config.polynomial_grid.l_xi,
        t_nucl,
    )?);

    let settings = EomSettings {
        err_tol: config.eom.err_tol,
        max_iterations: config.eom.max_iterations,
        press_rel_err_tol: config.eom.press_rel_err_tol,
        initial_width: config.polynomial_grid.l_xi / 5.0,
        max_width: config.polynomial_grid.l_xi,
    };

    let mut solver = EomSolver::new(
        potential,
        phi_bot,
        phi_top,
        grid,
        particles,
        collisions,
        settings,
        include_offeq,
    );
    solver.run(&mut hydro).map_err(Error::from)
}

#[cfg(test)]
mod test {
    use super::*;

    struct BagPhase {
        a: f64,
    }
    impl EffectivePotential for BagPhase {
        fn field_count(&self) -> usize {
            1
        }
        fn evaluate(&self, fields: &[f64], _temperature: f64) -> f64 {
            fields[0] * fields[0]
        }
        fn constant_terms(&self, temperature: f64) -> f64 {
            -self.a * temperature.powi(4)
        }
    }

    fn bag_free_energy(a: f64) -> Arc<FreeEnergy> {
        let potential: Arc<dyn EffectivePotential> = Arc::new(BagPhase { a });
        Arc::new(
            FreeEnergy::trace(potential, 100.0, vec![0.0], 20.0, 400.0, 1.0, 1e-6, false, true)
                .unwrap(),
        )
    }

    #[test]
    fn lte_pipeline_runs_end_to_end() {
        let config = Config::default();
        let potential = BagPhase { a: 1.2 };
        // `v_eff = -a*T^4` at the traced minimum: the low phase needs the
        // larger `a` to be the deeper, true vacuum.
        let high = bag_free_energy(1.0);
        let low = bag_free_energy(1.2);

        let results = solve_wall_velocity(
            &config,
            &potential,
            high,
            low,
            100.0,
            vec![1.0],
            vec![0.0],
            vec![],
            HashMap::new(),
            false,
        )
        .unwrap();

        assert!(results.wall_velocity > 0.0 && results.wall_velocity < 1.0);
        assert!(!results.has_out_of_equilibrium);
    }
}
