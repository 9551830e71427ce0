//! A small single-field finite-temperature quartic potential, used only in
//! tests across this workspace as a stand-in for a real particle-physics
//! model. Shaped like the textbook electroweak toy potential so that it
//! has a genuine high-T symmetric phase, a low-T broken phase, and a
//! first-order transition between them.

use crate::effective_potential::EffectivePotential;

/// `V(phi, T) = D(T^2 - T0^2) phi^2 - E T phi^3 + (lambda/4) phi^4`.
#[derive(Debug, Clone, Copy)]
pub struct QuarticToyPotential {
    pub d: f64,
    pub e: f64,
    pub lambda: f64,
    pub t0: f64,
}

impl Default for QuarticToyPotential {
    fn default() -> Self {
        Self {
            d: 0.5,
            e: 0.2,
            lambda: 1.0,
            t0: 100.0,
        }
    }
}

impl EffectivePotential for QuarticToyPotential {
    fn field_count(&self) -> usize {
        1
    }

    fn evaluate(&self, fields: &[f64], temperature: f64) -> f64 {
        let phi = fields[0];
        self.d * (temperature * temperature - self.t0 * self.t0) * phi * phi
            - self.e * temperature * phi.powi(3)
            + 0.25 * self.lambda * phi.powi(4)
    }

    fn constant_terms(&self, _temperature: f64) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn symmetric_phase_is_always_a_stationary_point() {
        let model = QuarticToyPotential::default();
        for &t in &[50.0, 100.0, 150.0] {
            let grad = model.deriv_field(&[0.0], t);
            assert!(grad[0].abs() < 1e-6, "t={t}");
        }
    }

    #[test]
    fn broken_phase_appears_below_t0() {
        let model = QuarticToyPotential::default();
        let (phi, v) = model.find_local_minimum(&[150.0], 80.0).unwrap();
        assert!(phi[0] > 1.0);
        assert!(v < 0.0);
    }
}
