use std::sync::Arc;

use wallspeed_potential::toy::QuarticToyPotential;
use wallspeed_potential::{EffectivePotential, FreeEnergy};

#[test]
fn test_traced_broken_phase_stays_near_the_local_minimum() {
    let potential: Arc<dyn EffectivePotential> = Arc::new(QuarticToyPotential::default());
    let free_energy =
        FreeEnergy::trace(potential.clone(), 80.0, vec![5.0], 50.0, 120.0, 0.5, 1e-8, false, true)
            .unwrap();

    for &t in &[60.0, 80.0, 100.0] {
        let traced = free_energy.evaluate(t).unwrap();
        let grad = potential.deriv_field(&traced.fields, t);
        assert!(grad[0].abs() < 1e-3, "t={t}, grad={:?}", grad);
    }
}
