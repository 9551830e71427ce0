//! Traces one phase's local minimum as a function of temperature by
//! integrating the implicit equation `dV/dphi(phi(T), T) = 0`, and exposes
//! the result as an adaptively-interpolated `(phi(T), V(T))` oracle.

use std::sync::Arc;

use nalgebra::DVector;
use wallspeed_grid::{ExtrapolationPolicy, InterpolatableFunction};
use wallspeed_numerics::ivp::{IvpSolver, IvpStatus};

use crate::effective_potential::EffectivePotential;
use crate::error::{PotentialError, Result};

/// Value of a free-energy minimum at a given temperature: the field
/// location and the potential value there.
#[derive(Debug, Clone)]
pub struct FreeEnergyValue {
    pub fields: Vec<f64>,
    pub v_eff: f64,
}

/// `T |-> (phi_min(T), V(phi_min(T), T))` for one phase, valid on
/// `[min_temperature(), max_temperature()]`.
pub struct FreeEnergy {
    potential: Arc<dyn EffectivePotential>,
    starting_temperature: f64,
    starting_phase_location_guess: Vec<f64>,
    min_possible_temperature: f64,
    max_possible_temperature: f64,
    table: InterpolatableFunction,
}

/// Raw samples collected while integrating up and down from the starting
/// temperature, used to build the interpolation table.
struct RawTrace {
    temperatures: Vec<f64>,
    fields: Vec<Vec<f64>>,
    potentials: Vec<f64>,
}

impl RawTrace {
    /// Piecewise-linear lookup between the two bracketing samples.
    fn value_at(&self, t: f64) -> Vec<f64> {
        let n = self.temperatures.len();
        let idx = match self
            .temperatures
            .binary_search_by(|probe| probe.partial_cmp(&t).unwrap())
        {
            Ok(i) => i,
            Err(i) => i,
        };
        let (lo, hi) = if idx == 0 {
            (0, 1.min(n - 1))
        } else if idx >= n {
            (n - 2, n - 1)
        } else {
            (idx - 1, idx)
        };
        let t_lo = self.temperatures[lo];
        let t_hi = self.temperatures[hi];
        let frac = if (t_hi - t_lo).abs() < 1e-300 {
            0.0
        } else {
            (t - t_lo) / (t_hi - t_lo)
        };

        let mut out = Vec::with_capacity(self.fields[lo].len() + 1);
        for k in 0..self.fields[lo].len() {
            out.push(self.fields[lo][k] + frac * (self.fields[hi][k] - self.fields[lo][k]));
        }
        out.push(self.potentials[lo] + frac * (self.potentials[hi] - self.potentials[lo]));
        out
    }
}

impl FreeEnergy {
    /// Traces the phase starting at `starting_phase_location_guess` /
    /// `starting_temperature`, over `[t_min, t_max]` with IVP step `dt`.
    /// `spinodal` stops tracing when a Hessian eigenvalue crosses zero;
    /// `paranoid` re-solves the local minimum after every accepted step.
    #[allow(clippy::too_many_arguments)]
    pub fn trace(
        potential: Arc<dyn EffectivePotential>,
        starting_temperature: f64,
        starting_phase_location_guess: Vec<f64>,
        t_min: f64,
        t_max: f64,
        dt: f64,
        r_tol: f64,
        spinodal: bool,
        paranoid: bool,
    ) -> Result<Self> {
        let field_count = potential.field_count();
        let t0 = starting_temperature;
        let (phase0, v0) =
            potential.find_local_minimum(&starting_phase_location_guess, t0)?;

        let scale = phase0
            .iter()
            .map(|f| f.abs())
            .fold(t0.abs(), f64::max);
        let tol_absolute = r_tol * scale;

        let hessian0 = potential.deriv2_field2(&phase0, t0);
        let eigs0 = hessian0.clone().symmetric_eigen().eigenvalues;
        let min_eig = eigs0.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_eig = eigs0.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min_eig * max_eig <= 0.0 {
            return Err(PotentialError::UnstableStartingPhase { t: t0 });
        }

        let mut raw = RawTrace {
            temperatures: vec![t0],
            fields: vec![phase0.clone()],
            potentials: vec![v0],
        };

        for t_end in [t_max, t_min] {
            let potential_ref = Arc::clone(&potential);
            let potential_ref_event = Arc::clone(&potential);
            let rhs = move |t: f64, y: &DVector<f64>| -> DVector<f64> {
                let fields: Vec<f64> = y.iter().copied().collect();
                let a = potential_ref.deriv2_field2(&fields, t);
                let b: Vec<f64> = potential_ref
                    .deriv2_field_t(&fields, t)
                    .into_iter()
                    .map(|v| -v)
                    .collect();
                let b = DVector::from_vec(b);
                a.lu().solve(&b).unwrap_or_else(|| DVector::zeros(field_count))
            };
            let event = move |t: f64, y: &DVector<f64>| -> f64 {
                if !spinodal {
                    return 1.0;
                }
                let fields: Vec<f64> = y.iter().copied().collect();
                let hessian = potential_ref_event.deriv2_field2(&fields, t);
                hessian
                    .symmetric_eigen()
                    .eigenvalues
                    .iter()
                    .cloned()
                    .fold(f64::INFINITY, f64::min)
            };

            let mut solver = IvpSolver::new(
                rhs,
                t0,
                DVector::from_vec(phase0.clone()),
                t_end,
                r_tol,
                tol_absolute,
                dt,
            )
            .with_event(event);

            let mut samples: Vec<(f64, Vec<f64>, f64)> = Vec::new();
            while solver.is_running() {
                solver.step();
                if let IvpStatus::Error(reason) = solver.status() {
                    return Err(PotentialError::PhaseTraceFailed {
                        reason: reason.clone(),
                    });
                }
                let t = solver.t();
                let mut y: Vec<f64> = solver.y().iter().copied().collect();
                let v = if paranoid {
                    let (refined_phase, refined_v) = potential.find_local_minimum(&y, t)?;
                    solver.set_y(DVector::from_vec(refined_phase.clone()));
                    y = refined_phase;
                    refined_v
                } else {
                    potential.evaluate(&y, t)
                };
                samples.push((t, y, v));
                if solver.step_size().abs() < 1e-16 * t0.abs().max(1.0) {
                    break;
                }
            }

            if t_end >= t0 {
                for (t, y, v) in samples {
                    raw.temperatures.push(t);
                    raw.fields.push(y);
                    raw.potentials.push(v);
                }
            } else {
                for (t, y, v) in samples.into_iter().rev() {
                    raw.temperatures.insert(0, t);
                    raw.fields.insert(0, y);
                    raw.potentials.insert(0, v);
                }
            }
        }

        let t_lo = *raw
            .temperatures
            .iter()
            .fold(None, |acc: Option<&f64>, v| match acc {
                None => Some(v),
                Some(a) => Some(if v < a { v } else { a }),
            })
            .unwrap();
        let t_hi = *raw
            .temperatures
            .iter()
            .fold(None, |acc: Option<&f64>, v| match acc {
                None => Some(v),
                Some(a) => Some(if v > a { v } else { a }),
            })
            .unwrap();

        let min_possible_temperature = t_lo + 2.0 * dt;
        let max_possible_temperature = t_hi - 2.0 * dt;
        if max_possible_temperature <= min_possible_temperature {
            return Err(PotentialError::EmptyTemperatureRange {
                min: min_possible_temperature,
                max: max_possible_temperature,
            });
        }

        let table = InterpolatableFunction::new_adaptive(
            |t| raw.value_at(t),
            min_possible_temperature,
            max_possible_temperature,
            1e-8,
            512,
        )?
        .with_extrapolation(ExtrapolationPolicy::Error, ExtrapolationPolicy::Error);

        Ok(Self {
            potential,
            starting_temperature,
            starting_phase_location_guess,
            min_possible_temperature,
            max_possible_temperature,
            table,
        })
    }

    pub fn min_temperature(&self) -> f64 {
        self.min_possible_temperature
    }

    pub fn max_temperature(&self) -> f64 {
        self.max_possible_temperature
    }

    pub fn starting_temperature(&self) -> f64 {
        self.starting_temperature
    }

    pub fn starting_phase_location_guess(&self) -> &[f64] {
        &self.starting_phase_location_guess
    }

    pub fn potential(&self) -> &Arc<dyn EffectivePotential> {
        &self.potential
    }

    pub fn evaluate(&self, temperature: f64) -> Result<FreeEnergyValue> {
        let row = self
            .table
            .evaluate(temperature)
            .map_err(|_| PotentialError::EmptyTemperatureRange {
                min: self.min_possible_temperature,
                max: self.max_possible_temperature,
            })?;
        let (fields, v_eff) = row.split_at(row.len() - 1);
        Ok(FreeEnergyValue {
            fields: fields.to_vec(),
            v_eff: v_eff[0],
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::effective_potential::EffectivePotential;

    /// A single-field quadratic well whose minimum drifts linearly with T,
    /// smooth and stable everywhere: `V = (phi - T)^2`.
    struct DriftingWell;
    impl EffectivePotential for DriftingWell {
        fn field_count(&self) -> usize {
            1
        }
        fn evaluate(&self, fields: &[f64], temperature: f64) -> f64 {
            (fields[0] - temperature).powi(2)
        }
    }

    #[test]
    fn traces_phase_and_recovers_linear_minimum() {
        let potential: Arc<dyn EffectivePotential> = Arc::new(DriftingWell);
        let free_energy = FreeEnergy::trace(
            potential,
            5.0,
            vec![5.0],
            1.0,
            9.0,
            0.2,
            1e-6,
            false,
            true,
        )
        .unwrap();

        for &t in &[2.0, 5.0, 7.5] {
            if t < free_energy.min_temperature() || t > free_energy.max_temperature() {
                continue;
            }
            let value = free_energy.evaluate(t).unwrap();
            assert!((value.fields[0] - t).abs() < 1e-2, "t={t}");
            assert!(value.v_eff.abs() < 1e-2, "t={t}");
        }
    }
}
