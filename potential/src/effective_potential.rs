//! The `EffectivePotential` capability: the one interface external models
//! must implement. Everything else in this module (minimization,
//! derivatives, critical temperature) has a sensible default built on top
//! of just `evaluate` and `field_count`.

use nalgebra::DMatrix;
use wallspeed_numerics::{nelder_mead, root};

use crate::error::{PotentialError, Result};

/// Oracle `V(phi, T)` plus the handful of derived quantities the rest of
/// the solver needs: local minima, gradients, and critical temperatures.
///
/// Implementors provide only [`EffectivePotential::evaluate`] (and,
/// usually, [`EffectivePotential::constant_terms`]); the derivative and
/// minimization methods below have default implementations matching the
/// reference behavior (4th-order finite differences, Nelder-Mead,
/// bracket-then-Brent).
pub trait EffectivePotential: Send + Sync {
    /// Number of background fields `F`.
    fn field_count(&self) -> usize;

    /// Field-dependent part of the potential. Normalization is free: a
    /// model may choose `evaluate(0, T) = 0`.
    fn evaluate(&self, fields: &[f64], temperature: f64) -> f64;

    /// Field-independent but temperature-dependent terms (e.g. light
    /// degrees of freedom not integrated over in `evaluate`). Added to
    /// `evaluate` to get the full free-energy density.
    fn constant_terms(&self, _temperature: f64) -> f64 {
        0.0
    }

    /// Cutoff used to avoid spurious behavior (e.g. logarithms) near
    /// `phi = 0`.
    fn field_lower_bound(&self) -> f64 {
        1e-8
    }

    fn d_phi(&self) -> f64 {
        1e-3
    }

    fn d_t(&self) -> f64 {
        1e-3
    }

    fn evaluate_with_constant_part(&self, fields: &[f64], temperature: f64) -> f64 {
        self.evaluate(fields, temperature) + self.constant_terms(temperature)
    }

    /// `dV/dphi`, 4th-order central finite difference by default.
    fn deriv_field(&self, fields: &[f64], temperature: f64) -> Vec<f64> {
        let h = self.d_phi();
        (0..self.field_count())
            .map(|i| {
                let f = |delta: f64| {
                    let mut shifted = fields.to_vec();
                    shifted[i] += delta;
                    self.evaluate(&shifted, temperature)
                };
                fourth_order_derivative(f, h)
            })
            .collect()
    }

    /// `dV/dT`, 4th-order central finite difference by default.
    fn deriv_t(&self, fields: &[f64], temperature: f64) -> f64 {
        let h = self.d_t();
        let f = |delta: f64| self.evaluate(fields, temperature + delta);
        fourth_order_derivative(f, h)
    }

    /// Field-space Hessian `d^2V/dphi_i dphi_j`, central differences.
    fn deriv2_field2(&self, fields: &[f64], temperature: f64) -> DMatrix<f64> {
        let n = self.field_count();
        let h = self.d_phi();
        let mut hessian = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let value = mixed_second_derivative(
                    |di, dj| {
                        let mut shifted = fields.to_vec();
                        shifted[i] += di;
                        shifted[j] += dj;
                        self.evaluate(&shifted, temperature)
                    },
                    h,
                    h,
                );
                hessian[(i, j)] = value;
                hessian[(j, i)] = value;
            }
        }
        hessian
    }

    /// `d^2V/dphi_i dT`, central differences.
    fn deriv2_field_t(&self, fields: &[f64], temperature: f64) -> Vec<f64> {
        let h_phi = self.d_phi();
        let h_t = self.d_t();
        (0..self.field_count())
            .map(|i| {
                mixed_second_derivative(
                    |di, dt| {
                        let mut shifted = fields.to_vec();
                        shifted[i] += di;
                        self.evaluate(&shifted, temperature + dt)
                    },
                    h_phi,
                    h_t,
                )
            })
            .collect()
    }

    /// Unconstrained minimization seeded at `initial_guess`, Nelder-Mead by
    /// default. Returns `(phi*, V*)`.
    fn find_local_minimum(&self, initial_guess: &[f64], temperature: f64) -> Result<(Vec<f64>, f64)> {
        let (argmin, value) =
            nelder_mead::minimize(|x| self.evaluate(x, temperature), initial_guess, 1e-12, 2000)?;
        Ok((argmin, value))
    }

    /// Finds `T_c` such that the free energies of `phase_a` and `phase_b`
    /// cross, searching only `[t_min, t_max]`: coarse stepping to bracket
    /// the sign change, then Brent's method to refine.
    fn find_critical_temperature(
        &self,
        phase_a: &[f64],
        phase_b: &[f64],
        t_min: f64,
        t_max: f64,
    ) -> Result<f64> {
        if t_max < t_min {
            return Err(PotentialError::InvalidTemperatureRange { t_min, t_max });
        }

        let mut difference = |t: f64| -> Result<f64> {
            let (_, v_a) = self.find_local_minimum(phase_a, t)?;
            let (_, v_b) = self.find_local_minimum(phase_b, t)?;
            Ok(v_b - v_a)
        };

        let steps = 200usize;
        let dt = ((t_max - t_min) / steps as f64).max(1e-8);
        let sign_at_start = difference(t_min)?.signum();

        let mut t = t_min;
        let mut bracket_hi = None;
        while t < t_max {
            t += dt;
            if difference(t)?.signum() != sign_at_start {
                bracket_hi = Some(t);
                break;
            }
        }

        let Some(hi) = bracket_hi else {
            return Err(PotentialError::CriticalTemperatureNotBracketed { t_min, t_max });
        };
        let lo = hi - dt;

        let root = root::brent(
            |t| difference(t).unwrap_or(f64::NAN),
            lo,
            hi,
            1e-6 * hi.abs().max(1.0),
            200,
        )
        .map_err(PotentialError::from)?;
        Ok(root)
    }
}

/// `f'(0)` via the standard 4th-order central-difference stencil:
/// `(-f(2h) + 8f(h) - 8f(-h) + f(-2h)) / (12h)`.
fn fourth_order_derivative(mut f: impl FnMut(f64) -> f64, h: f64) -> f64 {
    (-f(2.0 * h) + 8.0 * f(h) - 8.0 * f(-h) + f(-2.0 * h)) / (12.0 * h)
}

/// Mixed second partial `d^2 g / (d_a d_b)` of `g(delta_a, delta_b)` around
/// the origin, via the standard 4-point central-difference stencil.
fn mixed_second_derivative(mut g: impl FnMut(f64, f64) -> f64, ha: f64, hb: f64) -> f64 {
    (g(ha, hb) - g(ha, -hb) - g(-ha, hb) + g(-ha, -hb)) / (4.0 * ha * hb)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Quadratic;
    impl EffectivePotential for Quadratic {
        fn field_count(&self) -> usize {
            1
        }
        fn evaluate(&self, fields: &[f64], temperature: f64) -> f64 {
            let x = fields[0];
            (x - temperature).powi(2)
        }
    }

    #[test]
    fn deriv_field_matches_analytic_gradient() {
        let model = Quadratic;
        let grad = model.deriv_field(&[3.0], 1.0);
        assert!((grad[0] - 2.0 * (3.0 - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn find_local_minimum_locates_vertex() {
        let model = Quadratic;
        let (argmin, value) = model.find_local_minimum(&[10.0], 2.0).unwrap();
        assert!((argmin[0] - 2.0).abs() < 1e-3);
        assert!(value < 1e-6);
    }

    struct CrossingModel;
    impl EffectivePotential for CrossingModel {
        fn field_count(&self) -> usize {
            1
        }
        fn evaluate(&self, fields: &[f64], temperature: f64) -> f64 {
            // phase_a sits at phi=0 with V=0; phase_b sits at phi=1 with
            // V = (T - 5).
            let x = fields[0];
            if x < 0.5 {
                x * x
            } else {
                (temperature - 5.0) + (x - 1.0).powi(2)
            }
        }
    }

    #[test]
    fn find_critical_temperature_brackets_and_refines() {
        let model = CrossingModel;
        let tc = model
            .find_critical_temperature(&[0.0], &[1.0], 0.0, 10.0)
            .unwrap();
        assert!((tc - 5.0).abs() < 0.1);
    }
}
