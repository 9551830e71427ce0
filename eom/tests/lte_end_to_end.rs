use std::collections::HashMap;
use std::sync::Arc;

use wallspeed_eom::{EomSettings, EomSolver};
use wallspeed_grid::Grid;
use wallspeed_hydrodynamics::{Hydrodynamics, Thermodynamics};
use wallspeed_potential::{EffectivePotential, FreeEnergy};

/// Constant-sound-speed (`c_s^2 = 1/3`) bag phase, `v_eff = -a*T^4` at its
/// minimum.
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
    Arc::new(FreeEnergy::trace(potential, 100.0, vec![0.0], 20.0, 400.0, 1.0, 1e-6, false, true).unwrap())
}

/// The toy-potential end-to-end scenario: a bag-model transition solved
/// in local thermal equilibrium should report a wall velocity consistent
/// with the hydrodynamic engine's own LTE root-find.
#[test]
fn test_toy_potential_lte_run_matches_hydro_find_vw_lte() {
    // `v_eff = -a*T^4` at the traced minimum: the low phase needs the
    // larger `a` to be the deeper, true vacuum.
    let high = bag_free_energy(1.0);
    let low = bag_free_energy(1.2);
    let thermo = Thermodynamics::new(high, low, 100.0);
    let mut hydro = Hydrodynamics::new(thermo, 3.0, 0.2, 1e-6, 1e-6).unwrap();

    let grid = Arc::new(Grid::new_symmetric(10, 5, 5.0, 1.0).unwrap());
    let potential = BagPhase { a: 1.2 };
    let settings = EomSettings {
        err_tol: 1e-6,
        max_iterations: 50,
        press_rel_err_tol: 1e-3,
        initial_width: 1.0,
        max_width: 20.0,
    };
    let mut solver = EomSolver::new(&potential, vec![1.0], vec![0.0], grid, vec![], HashMap::new(), settings, false);

    let results = solver.run(&mut hydro).unwrap();
    assert!(results.wall_velocity > 0.0 && results.wall_velocity < 1.0);

    let vw_lte = hydro.find_vw_lte().unwrap();
    let relative_error = (results.wall_velocity - vw_lte).abs() / vw_lte;
    assert!(relative_error < 2e-2, "relative_error={relative_error}");
}
