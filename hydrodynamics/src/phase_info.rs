//! The nucleation temperature and the two phases a transition proceeds
//! between, with the setup-time check that the transition actually runs
//! downhill in free energy.

use std::sync::Arc;

use wallspeed_potential::FreeEnergy;

use crate::error::{HydroError, Result};

/// `(T_n, phi_1, phi_2)`: the nucleation temperature and the field
/// locations of the high- and low-temperature phase minima there.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    pub t_nucl: f64,
    pub phi_high: Vec<f64>,
    pub phi_low: Vec<f64>,
}

impl PhaseInfo {
    /// Evaluates both phases at `t_nucl` and checks that the low-T phase
    /// is the true vacuum there, i.e. `V(phi_2, T_n) < V(phi_1, T_n)`.
    /// Fatal at setup: a transition that does not run downhill in free
    /// energy cannot be a real nucleation.
    pub fn new(free_energy_high: &Arc<FreeEnergy>, free_energy_low: &Arc<FreeEnergy>, t_nucl: f64) -> Result<Self> {
        let high = free_energy_high.evaluate(t_nucl)?;
        let low = free_energy_low.evaluate(t_nucl)?;
        if low.v_eff >= high.v_eff {
            return Err(HydroError::InverseTransition {
                t_nucl,
                v_high: high.v_eff,
                v_low: low.v_eff,
            });
        }
        Ok(Self {
            t_nucl,
            phi_high: high.fields,
            phi_low: low.fields,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wallspeed_potential::EffectivePotential;

    /// Constant sound speed `c_s^2 = 1/3` bag phase, offset by `a`.
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
            FreeEnergy::trace(potential, 100.0, vec![0.0], 50.0, 150.0, 0.5, 1e-6, false, true)
                .unwrap(),
        )
    }

    #[test]
    fn accepts_a_genuine_transition() {
        // v_eff = -a*T^4 at the (fields=0) minimum: a bigger `a` for the
        // low phase makes it the deeper, true vacuum.
        let high = bag_free_energy(1.0);
        let low = bag_free_energy(2.0);
        let info = PhaseInfo::new(&high, &low, 100.0).unwrap();
        assert_eq!(info.t_nucl, 100.0);
    }

    #[test]
    fn rejects_an_inverted_transition() {
        let high = bag_free_energy(2.0);
        let low = bag_free_energy(1.0);
        let err = PhaseInfo::new(&high, &low, 100.0).unwrap_err();
        assert!(matches!(err, HydroError::InverseTransition { .. }));
    }
}
