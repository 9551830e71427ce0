//! Pressure, energy density, enthalpy and sound speed of the two traced
//! phases, plus a bag-like extrapolating wrapper for temperatures outside
//! the range the phase tracer actually covered.
//!
//! `Thermodynamics` only answers inside `[min_temperature, max_temperature]`
//! of each [`FreeEnergy`]; `ThermodynamicsExtrapolate` is what
//! [`crate::Hydrodynamics`] actually talks to, since the matching and shock
//! solvers routinely probe a few percent outside the traced window.

use std::sync::Arc;

use wallspeed_potential::FreeEnergy;

use crate::error::Result;

/// Relative step used for the finite-difference temperature derivatives
/// (`dp/dT`, `de/dT`). Distinct from the phase tracer's own `d_t`.
const FD_RELATIVE_STEP: f64 = 1e-4;

/// Pressure `p(T) = -(V_eff(T) + constant_terms(T))`, and the energy
/// density/enthalpy/sound speed derived from it, for the high-temperature
/// (symmetric) and low-temperature (broken) phases.
pub struct Thermodynamics {
    free_energy_high: Arc<FreeEnergy>,
    free_energy_low: Arc<FreeEnergy>,
    nucleation_temperature: f64,
}

impl Thermodynamics {
    pub fn new(
        free_energy_high: Arc<FreeEnergy>,
        free_energy_low: Arc<FreeEnergy>,
        nucleation_temperature: f64,
    ) -> Self {
        Self {
            free_energy_high,
            free_energy_low,
            nucleation_temperature,
        }
    }

    pub fn nucleation_temperature(&self) -> f64 {
        self.nucleation_temperature
    }

    pub fn free_energy_high(&self) -> &Arc<FreeEnergy> {
        &self.free_energy_high
    }

    pub fn free_energy_low(&self) -> &Arc<FreeEnergy> {
        &self.free_energy_low
    }

    fn pressure(free_energy: &FreeEnergy, temperature: f64) -> Result<f64> {
        let value = free_energy.evaluate(temperature)?;
        let constant = free_energy.potential().constant_terms(temperature);
        Ok(-(value.v_eff + constant))
    }

    pub fn p_high(&self, t: f64) -> Result<f64> {
        Self::pressure(&self.free_energy_high, t)
    }

    pub fn p_low(&self, t: f64) -> Result<f64> {
        Self::pressure(&self.free_energy_low, t)
    }

    fn dp_dt(free_energy: &FreeEnergy, t: f64) -> Result<f64> {
        let h = FD_RELATIVE_STEP * t.abs().max(1.0);
        let p_plus = Self::pressure(free_energy, t + h)?;
        let p_minus = Self::pressure(free_energy, t - h)?;
        Ok((p_plus - p_minus) / (2.0 * h))
    }

    pub fn dp_high(&self, t: f64) -> Result<f64> {
        Self::dp_dt(&self.free_energy_high, t)
    }

    pub fn dp_low(&self, t: f64) -> Result<f64> {
        Self::dp_dt(&self.free_energy_low, t)
    }

    /// `e = T p' - p`.
    pub fn e_high(&self, t: f64) -> Result<f64> {
        Ok(t * self.dp_high(t)? - self.p_high(t)?)
    }

    pub fn e_low(&self, t: f64) -> Result<f64> {
        Ok(t * self.dp_low(t)? - self.p_low(t)?)
    }

    /// `w = e + p`.
    pub fn w_high(&self, t: f64) -> Result<f64> {
        Ok(self.e_high(t)? + self.p_high(t)?)
    }

    pub fn w_low(&self, t: f64) -> Result<f64> {
        Ok(self.e_low(t)? + self.p_low(t)?)
    }

    pub fn de_dt_high(&self, t: f64) -> Result<f64> {
        let h = FD_RELATIVE_STEP * t.abs().max(1.0);
        Ok((self.e_high(t + h)? - self.e_high(t - h)?) / (2.0 * h))
    }

    pub fn de_dt_low(&self, t: f64) -> Result<f64> {
        let h = FD_RELATIVE_STEP * t.abs().max(1.0);
        Ok((self.e_low(t + h)? - self.e_low(t - h)?) / (2.0 * h))
    }

    /// `c_s^2 = dp/de`.
    pub fn csq_high(&self, t: f64) -> Result<f64> {
        Ok(self.dp_high(t)? / self.de_dt_high(t)?)
    }

    pub fn csq_low(&self, t: f64) -> Result<f64> {
        Ok(self.dp_low(t)? / self.de_dt_low(t)?)
    }
}

/// Wraps [`Thermodynamics`], extrapolating `p`/`e`/`w`/`c_s^2` outside the
/// traced range by freezing the sound speed at the boundary value and
/// continuing the bag-like power law `p(T) = p_edge (T/T_edge)^{1+1/c_s_edge^2}`,
/// for which `e = p / c_s_edge^2` and `w = p (1 + 1/c_s_edge^2)` identically.
pub struct ThermodynamicsExtrapolate {
    thermodynamics: Thermodynamics,
    t_min_high: f64,
    t_max_high: f64,
    t_min_low: f64,
    t_max_low: f64,
}

impl ThermodynamicsExtrapolate {
    pub fn new(thermodynamics: Thermodynamics) -> Self {
        let t_min_high = thermodynamics.free_energy_high.min_temperature();
        let t_max_high = thermodynamics.free_energy_high.max_temperature();
        let t_min_low = thermodynamics.free_energy_low.min_temperature();
        let t_max_low = thermodynamics.free_energy_low.max_temperature();
        Self {
            thermodynamics,
            t_min_high,
            t_max_high,
            t_min_low,
            t_max_low,
        }
    }

    pub fn inner(&self) -> &Thermodynamics {
        &self.thermodynamics
    }

    pub fn nucleation_temperature(&self) -> f64 {
        self.thermodynamics.nucleation_temperature()
    }

    pub fn max_possible_temperature_high(&self) -> f64 {
        self.t_max_high
    }

    pub fn min_possible_temperature_high(&self) -> f64 {
        self.t_min_high
    }

    pub fn max_possible_temperature_low(&self) -> f64 {
        self.t_max_low
    }

    pub fn min_possible_temperature_low(&self) -> f64 {
        self.t_min_low
    }

    fn extrapolate(&self, t: f64, edge: f64, p_edge: f64, csq_edge: f64) -> f64 {
        let exponent = 1.0 + 1.0 / csq_edge;
        p_edge * (t / edge).powf(exponent)
    }

    fn p_bounded(
        &self,
        t: f64,
        t_min: f64,
        t_max: f64,
        p_in: impl Fn(f64) -> Result<f64>,
        csq_in: impl Fn(f64) -> Result<f64>,
    ) -> Result<f64> {
        if t >= t_min && t <= t_max {
            return p_in(t);
        }
        let edge = if t < t_min { t_min } else { t_max };
        let p_edge = p_in(edge)?;
        let csq_edge = csq_in(edge)?;
        Ok(self.extrapolate(t, edge, p_edge, csq_edge))
    }

    pub fn p_high(&self, t: f64) -> Result<f64> {
        self.p_bounded(
            t,
            self.t_min_high,
            self.t_max_high,
            |t| self.thermodynamics.p_high(t),
            |t| self.thermodynamics.csq_high(t),
        )
    }

    pub fn p_low(&self, t: f64) -> Result<f64> {
        self.p_bounded(
            t,
            self.t_min_low,
            self.t_max_low,
            |t| self.thermodynamics.p_low(t),
            |t| self.thermodynamics.csq_low(t),
        )
    }

    fn csq_bounded(
        &self,
        t: f64,
        t_min: f64,
        t_max: f64,
        csq_in: impl Fn(f64) -> Result<f64>,
    ) -> Result<f64> {
        if t >= t_min && t <= t_max {
            return csq_in(t);
        }
        let edge = if t < t_min { t_min } else { t_max };
        csq_in(edge)
    }

    pub fn csq_high(&self, t: f64) -> Result<f64> {
        self.csq_bounded(t, self.t_min_high, self.t_max_high, |t| {
            self.thermodynamics.csq_high(t)
        })
    }

    pub fn csq_low(&self, t: f64) -> Result<f64> {
        self.csq_bounded(t, self.t_min_low, self.t_max_low, |t| {
            self.thermodynamics.csq_low(t)
        })
    }

    pub fn e_high(&self, t: f64) -> Result<f64> {
        Ok(self.p_high(t)? / self.csq_high(t)?)
    }

    pub fn e_low(&self, t: f64) -> Result<f64> {
        Ok(self.p_low(t)? / self.csq_low(t)?)
    }

    pub fn w_high(&self, t: f64) -> Result<f64> {
        Ok(self.p_high(t)? + self.e_high(t)?)
    }

    pub fn w_low(&self, t: f64) -> Result<f64> {
        Ok(self.p_low(t)? + self.e_low(t)?)
    }

    pub fn dp_high(&self, t: f64) -> Result<f64> {
        if t >= self.t_min_high && t <= self.t_max_high {
            return self.thermodynamics.dp_high(t);
        }
        Ok(self.w_high(t)? / t)
    }

    pub fn dp_low(&self, t: f64) -> Result<f64> {
        if t >= self.t_min_low && t <= self.t_max_low {
            return self.thermodynamics.dp_low(t);
        }
        Ok(self.w_low(t)? / t)
    }

    fn de_dt_generic(&self, t: f64, e: impl Fn(f64) -> Result<f64>) -> Result<f64> {
        let h = 1e-4 * t.abs().max(1.0);
        Ok((e(t + h)? - e(t - h)?) / (2.0 * h))
    }

    pub fn de_dt_high(&self, t: f64) -> Result<f64> {
        if t >= self.t_min_high && t <= self.t_max_high {
            return self.thermodynamics.de_dt_high(t);
        }
        self.de_dt_generic(t, |t| self.e_high(t))
    }

    pub fn de_dt_low(&self, t: f64) -> Result<f64> {
        if t >= self.t_min_low && t <= self.t_max_low {
            return self.thermodynamics.de_dt_low(t);
        }
        self.de_dt_generic(t, |t| self.e_low(t))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use wallspeed_potential::EffectivePotential;

    /// Constant, temperature-independent sound speed `c_s^2 = 1/3`
    /// everywhere (the bag model itself), so extrapolation is exact.
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
    fn bag_phase_has_sound_speed_one_third() {
        let fe = bag_free_energy(1.0);
        let thermo = Thermodynamics::new(fe.clone(), fe, 100.0);
        let csq = thermo.csq_high(100.0).unwrap();
        assert!((csq - 1.0 / 3.0).abs() < 1e-3, "csq={csq}");
    }

    #[test]
    fn extrapolation_preserves_sound_speed_outside_traced_range() {
        let high = bag_free_energy(2.0);
        let low = bag_free_energy(1.0);
        let t_min = low.min_temperature().max(high.min_temperature());
        let t_max = low.max_temperature().min(high.max_temperature());
        let thermo = Thermodynamics::new(high, low, 100.0);
        let extrapolated = ThermodynamicsExtrapolate::new(thermo);

        let t_outside = t_max + 5.0;
        let csq = extrapolated.csq_high(t_outside).unwrap();
        let csq_edge = extrapolated.csq_high(t_max).unwrap();
        assert!((csq - csq_edge).abs() < 1e-9);

        let _ = t_min;
    }
}
