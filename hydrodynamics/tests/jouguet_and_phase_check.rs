use std::sync::Arc;

use wallspeed_hydrodynamics::{HydroError, Hydrodynamics, Thermodynamics};
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

#[test]
fn test_jouguet_velocity_brackets_the_sound_speed() {
    let high = bag_free_energy(1.0);
    let low = bag_free_energy(1.2);
    let thermo = Thermodynamics::new(high, low, 100.0);
    let hydro = Hydrodynamics::new(thermo, 3.0, 0.2, 1e-6, 1e-6).unwrap();

    assert!(hydro.v_jouguet() > (1.0 / 3.0_f64).sqrt() - 1e-3);
    assert!(hydro.v_jouguet() < 1.0);
}

#[test]
fn test_setup_refuses_an_inverted_transition() {
    // Low-T phase shallower than the high-T phase: not a valid transition.
    let high = bag_free_energy(1.2);
    let low = bag_free_energy(1.0);
    let thermo = Thermodynamics::new(high, low, 100.0);

    let err = Hydrodynamics::new(thermo, 3.0, 0.2, 1e-6, 1e-6).unwrap_err();
    assert!(matches!(err, HydroError::InverseTransition { .. }));
}
