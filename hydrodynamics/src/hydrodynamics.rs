//! The matching and shock-front engine: given a trial wall velocity, fixes
//! the fluid variables `(v+, v-, T+, T-)` around the wall and, for
//! deflagrations and hybrids, the self-similar shock profile connecting
//! the wall to the (undisturbed) nucleation temperature far ahead of it.
//!
//! Grounded throughout on `original_source/src/WallGo/hydrodynamics.py`.
//! Conventions follow that file: velocities are always reported positive,
//! even in the wall frame; the sign flip to the EOM/Boltzmann convention
//! happens once, in [`Hydrodynamics::find_hydro_boundaries`].

use nalgebra::DVector;

use wallspeed_numerics::{levenberg_marquardt, root, IvpSolver, IvpStatus};

use crate::error::{HydroError, Result};
use crate::phase_info::PhaseInfo;
use crate::template_model::{boost_velocity, gamma_sq, TemplateModel};
use crate::thermodynamics::{Thermodynamics, ThermodynamicsExtrapolate};

/// Fluid matching parameters around the wall: `v+`, `v-`, `T+`, `T-`.
#[derive(Debug, Clone, Copy)]
pub struct MatchingPoint {
    pub vp: f64,
    pub vm: f64,
    pub tp: f64,
    pub tm: f64,
}

/// Boundary conditions handed to the scalar-field and plasma equations of
/// motion, in the EOM sign convention (`c1` carries a minus sign relative
/// to the hydrodynamic convention; see the module note above).
#[derive(Debug, Clone, Copy)]
pub struct HydroBoundaries {
    pub c1: f64,
    pub c2: f64,
    pub tp: f64,
    pub tm: f64,
    pub velocity_mid: f64,
}

pub struct Hydrodynamics {
    thermodynamics: ThermodynamicsExtrapolate,
    template: TemplateModel,
    t_nucl: f64,
    t_max_hydro: f64,
    t_min_hydro: f64,
    rtol: f64,
    atol: f64,
    v_jouguet: f64,
    v_bracket_low: f64,
    v_min: f64,
    last_match_converged: bool,
    phase_info: PhaseInfo,
}

impl Hydrodynamics {
    pub fn new(thermodynamics: Thermodynamics, tmax: f64, tmin: f64, rtol: f64, atol: f64) -> Result<Self> {
        let t_nucl = thermodynamics.nucleation_temperature();
        let t_max_hydro = tmax * t_nucl;
        let t_min_hydro = tmin * t_nucl;

        // Fatal at setup: refuse to proceed unless the low-T phase is
        // actually the true vacuum at the nucleation temperature.
        let phase_info = PhaseInfo::new(
            thermodynamics.free_energy_high(),
            thermodynamics.free_energy_low(),
            t_nucl,
        )?;

        let cs2b = thermodynamics.csq_low(t_nucl)?;
        let cs2s = thermodynamics.csq_high(t_nucl)?;
        let e_low = thermodynamics.e_low(t_nucl)?;
        let p_low = thermodynamics.p_low(t_nucl)?;
        let w_low = thermodynamics.w_low(t_nucl)?;
        let al = (e_low - 3.0 * p_low) / (3.0 * w_low);
        let template = TemplateModel::new(al, cs2b, cs2s);

        let thermodynamics = ThermodynamicsExtrapolate::new(thermodynamics);

        let mut engine = Self {
            thermodynamics,
            template,
            t_nucl,
            t_max_hydro,
            t_min_hydro,
            rtol,
            atol,
            v_jouguet: 0.0,
            v_bracket_low: 1e-3,
            v_min: 0.0,
            last_match_converged: true,
            phase_info,
        };

        engine.v_jouguet = engine
            .find_jouguet_velocity()
            .unwrap_or_else(|_| engine.template.v_jouguet());
        engine.v_min = engine
            .v_bracket_low
            .max(engine.min_velocity().unwrap_or(0.0));
        Ok(engine)
    }

    pub fn v_jouguet(&self) -> f64 {
        self.v_jouguet
    }

    pub fn v_min(&self) -> f64 {
        self.v_min
    }

    pub fn nucleation_temperature(&self) -> f64 {
        self.t_nucl
    }

    pub fn phase_info(&self) -> &PhaseInfo {
        &self.phase_info
    }

    pub fn last_match_converged(&self) -> bool {
        self.last_match_converged
    }

    pub fn thermodynamics(&self) -> &ThermodynamicsExtrapolate {
        &self.thermodynamics
    }

    /// Maps `(Tp, Tm) in (TMinHydro, TMaxHydro)^2` to `(-inf, inf)^2` via a
    /// centered `tan`, so a Newton-type solve can range freely without
    /// leaving the physical temperature window.
    fn mapping_t(&self, tp: f64, tm: f64) -> (f64, f64) {
        let mid = (self.t_max_hydro + self.t_min_hydro) / 2.0;
        let scale = self.t_max_hydro - self.t_min_hydro;
        let arg = std::f64::consts::PI / scale;
        ((arg * (tp - mid)).tan(), (arg * (tm - mid)).tan())
    }

    fn inverse_mapping_t(&self, mapped_tp: f64, mapped_tm: f64) -> (f64, f64) {
        let mid = (self.t_max_hydro + self.t_min_hydro) / 2.0;
        let scale = self.t_max_hydro - self.t_min_hydro;
        (
            mapped_tp.atan() * scale / std::f64::consts::PI + mid,
            mapped_tm.atan() * scale / std::f64::consts::PI + mid,
        )
    }

    /// `v+ v-` and `v+ / v-` from the matching conditions at `(Tp, Tm)`.
    pub fn vpvm_and_vpovm(&self, tp: f64, tm: f64) -> Result<(f64, f64)> {
        let p_high = self.thermodynamics.p_high(tp)?;
        let p_low = self.thermodynamics.p_low(tm)?;
        let e_high = self.thermodynamics.e_high(tp)?;
        let e_low = self.thermodynamics.e_low(tm)?;
        let vpvm = if e_high != e_low {
            (p_high - p_low) / (e_high - e_low)
        } else {
            (p_high - p_low) * 1e50
        };
        let vpovm = (e_low + p_high) / (e_high + p_low);
        Ok((vpvm, vpovm))
    }

    /// Stationarity point of `v+^2` with respect to `T-`, found by
    /// bracketing outward from `[Tnucl, min(2 Tnucl, TMaxLowT)]` and
    /// refining with Brent, falling back to a secant search if bracketing
    /// never succeeds.
    pub fn find_jouguet_velocity(&self) -> Result<f64> {
        let p_high_n = self.thermodynamics.p_high(self.t_nucl)?;
        let e_high_n = self.thermodynamics.e_high(self.t_nucl)?;

        let vp_deriv_num = |tm: f64| -> f64 {
            let p_low = self.thermodynamics.p_low(tm).unwrap_or(f64::NAN);
            let e_low = self.thermodynamics.e_low(tm).unwrap_or(f64::NAN);
            let dp_low = self.thermodynamics.dp_low(tm).unwrap_or(f64::NAN);
            let de_low = self.thermodynamics.de_dt_low(tm).unwrap_or(f64::NAN);

            let num1 = p_high_n - p_low;
            let num2 = p_high_n + e_low;
            let den1 = e_high_n - e_low;
            let den2 = e_high_n + p_low;
            let dnum1 = -dp_low;
            let dnum2 = de_low;
            let dden1 = -dnum2;
            let dden2 = -dnum1;

            dnum1 * num2 * den1 * den2 + num1 * dnum2 * den1 * den2
                - num1 * num2 * dden1 * den2
                - num1 * num2 * den1 * dden2
        };

        let mut t_min = self.t_nucl;
        let mut t_max = (2.0 * t_min)
            .max(self.thermodynamics.max_possible_temperature_low())
            .min(self.t_max_hydro);

        let mut bracket_lo = vp_deriv_num(t_min);
        let mut bracket_hi = vp_deriv_num(t_max);
        while bracket_lo.signum() == bracket_hi.signum() && t_max < self.t_max_hydro {
            t_min = t_max;
            t_max = (t_max + self.t_nucl).min(self.t_max_hydro);
            bracket_lo = vp_deriv_num(t_min);
            bracket_hi = vp_deriv_num(t_max);
        }

        let tm_sol = if bracket_lo.signum() != bracket_hi.signum() {
            root::brent(vp_deriv_num, self.t_nucl, t_max, self.atol, 200)
        } else {
            root::secant(vp_deriv_num, self.t_nucl, t_max, self.atol, 200)
        }
        .map_err(|err| HydroError::JouguetNotBracketed {
            reason: err.to_string(),
        })?;

        let p_low_sol = self.thermodynamics.p_low(tm_sol)?;
        let e_low_sol = self.thermodynamics.e_low(tm_sol)?;
        let vp_sq = (p_high_n - p_low_sol) * (p_high_n + e_low_sol)
            / (e_high_n - e_low_sol)
            / (e_high_n + p_low_sol);
        Ok(vp_sq.max(0.0).sqrt())
    }

    /// Detonation matching: `v+ = v_w`, `T+ = Tn`, and `T-` solves the
    /// energy-jump condition by bracketed Brent in `[Tn, Tmax]`.
    pub fn match_deton(&self, vw: f64) -> Result<MatchingPoint> {
        let vp = vw;
        let tp = self.t_nucl;
        let p_high = self.thermodynamics.p_high(tp)?;
        let w_high = self.thermodynamics.w_high(tp)?;
        let e_high = w_high - p_high;

        let tm_from_vpsq = |tm: f64| -> f64 {
            let p_low = self.thermodynamics.p_low(tm).unwrap_or(f64::NAN);
            let w_low = self.thermodynamics.w_low(tm).unwrap_or(f64::NAN);
            let e_low = w_low - p_low;
            vp * vp * (e_high - e_low) - (p_high - p_low) * (e_low + p_high) / (e_high + p_low)
        };

        let t_max = self.t_max_hydro;
        let tm = root::brent(tm_from_vpsq, self.t_nucl, t_max, self.atol, 200)
            .or_else(|_| root::secant(tm_from_vpsq, self.t_nucl, t_max, self.atol, 200))
            .map_err(|_| HydroError::MatchingFailure {
                vw,
                attempted: "detonation T- bracket".into(),
            })?;

        let (vpvm, vpovm) = self.vpvm_and_vpovm(tp, tm)?;
        let mut vm = (vpvm / vpovm).max(0.0).sqrt();
        if vp == 1.0 {
            vm = 1.0;
        }
        Ok(MatchingPoint { vp, vm, tp, tm })
    }

    /// Deflagration/hybrid matching: reduces the four matching unknowns to
    /// `(Tp, Tm)` and solves the pair via damped least squares on the
    /// tan-mapped variables (the Rust analogue of `scipy.optimize.root`'s
    /// `hybr` solver), seeded from the bag-model template.
    pub fn match_deflag_or_hyb(&mut self, vw: f64, vp_fixed: Option<f64>) -> Result<MatchingPoint> {
        let initial_guess = self
            .template
            .match_deflag_or_hyb_initial(self.t_nucl, vw.min(self.template.v_jouguet() - 1e-6), vp_fixed)
            .unwrap_or([1.1 * self.t_nucl, self.t_nucl]);
        let tpm0 = initial_guess;

        let mapped0 = self.mapping_t(tpm0[0], tpm0[1]);
        let x0 = [mapped0.0, mapped0.1];

        let residual = |mapped: &[f64]| -> Vec<f64> {
            let (tp, tm) = self.inverse_mapping_t(mapped[0], mapped[1]);
            let csq_low = self.thermodynamics.csq_low(tm).unwrap_or(f64::NAN);
            let vm_sq = vw.powi(2).min(csq_low);

            let vp_sq = if let Some(vp) = vp_fixed {
                vp * vp
            } else {
                (tm * tm - tp * tp * (1.0 - vm_sq)) / (tm * tm)
            };
            let (vpvm, vpovm) = self.vpvm_and_vpovm(tp, tm).unwrap_or((f64::NAN, f64::NAN));
            let eq1 = vpvm * vpovm - vp_sq;
            let eq2 = vpvm / vpovm - vm_sq;

            let scale = (4.0 + (tp / tpm0[0]).powi(2) + (tm / tpm0[1]).powi(2))
                * (4.0 + (tpm0[0] / tp).powi(2) + (tpm0[1] / tm).powi(2));
            vec![eq1 * scale, eq2 * scale]
        };

        let (solution, cost) = levenberg_marquardt::fit(residual, &x0, 1e-10, 200)?;
        self.last_match_converged = cost < 1e-6;

        let (tp, tm) = self.inverse_mapping_t(solution[0], solution[1]);
        let csq_low = self.thermodynamics.csq_low(tm)?;
        let vm = vw.powi(2).min(csq_low).max(0.0).sqrt();
        let vp = match vp_fixed {
            Some(vp) => vp,
            None => ((tm * tm - tp * tp * (1.0 - vm * vm)) / (tm * tm)).max(0.0).sqrt(),
        };

        if !vp.is_finite() {
            return Err(HydroError::MatchingFailure {
                vw,
                attempted: "deflagration/hybrid Newton solve".into(),
            });
        }
        Ok(MatchingPoint { vp, vm, tp, tm })
    }

    /// Shock-front ODE in the self-similar variable `v`: `dxi/dv`, `dT/dv`.
    fn shock_de(&self, v: f64, xi: f64, t: f64) -> Result<(f64, f64)> {
        if t <= 0.0 {
            return Err(HydroError::ShockTemperatureNegative { v, xi });
        }
        let csq_high = self.thermodynamics.csq_high(t)?;
        let mu = boost_velocity(xi, v);
        let eq1 = gamma_sq(v) * (1.0 - v * xi) * (mu * mu / csq_high - 1.0) * xi / (2.0 * v);
        let w_high = self.thermodynamics.w_high(t)?;
        let dp_high = self.thermodynamics.dp_high(t)?;
        let eq2 = w_high / dp_high * gamma_sq(v) * mu;
        Ok((eq1, eq2))
    }

    /// Integrates the shock profile from `v = mu(vw, vp)` down towards
    /// `v = 0`, stopping at the shock front (`mu(xi,v) xi = c_s^2(T)`), and
    /// returns the nucleation temperature implied by continuity of
    /// `T^{xi xi}` across the front.
    pub fn solve_hydro_shock(&self, vw: f64, vp: f64, tp: f64) -> Result<f64> {
        let vp_cent = boost_velocity(vw, vp);

        let shock_residual = |v: f64, xi: f64, t: f64| -> f64 {
            boost_velocity(xi, v) * xi - self.thermodynamics.csq_high(t).unwrap_or(f64::NAN)
        };

        let (xi_shock, vm_shock, tm_shock) = if shock_residual(vp_cent, vw, tp) > 0.0 {
            (vw, vp_cent, tp)
        } else if (vw - vp).abs() < 1e-12 {
            (self.thermodynamics.csq_high(tp)?.sqrt(), 0.0, tp)
        } else {
            let rhs = move |v: f64, y: &DVector<f64>| -> DVector<f64> {
                let (eq1, eq2) = self.shock_de(v, y[0], y[1]).unwrap_or((0.0, 0.0));
                DVector::from_vec(vec![eq1, eq2])
            };
            let event = move |v: f64, y: &DVector<f64>| -> f64 { shock_residual(v, y[0], y[1]) };
            let mut solver = IvpSolver::new(
                rhs,
                vp_cent,
                DVector::from_vec(vec![vw, tp]),
                1e-8,
                self.rtol,
                self.rtol * tp.abs().max(1.0),
                (vp_cent - 1e-8) / 50.0,
            )
            .with_event(event);
            loop {
                solver.step();
                match solver.status() {
                    IvpStatus::Error(_) => {
                        return Err(HydroError::ShockTemperatureNegative {
                            v: solver.t(),
                            xi: solver.y()[0],
                        });
                    }
                    IvpStatus::Event { .. } | IvpStatus::Finished => break,
                    IvpStatus::Running => {}
                }
            }
            (solver.y()[0], solver.t(), solver.y()[1])
        };

        let tii_shock = |tn: f64| -> f64 {
            let w_high_tn = self.thermodynamics.w_high(tn).unwrap_or(f64::NAN);
            let w_high_tm = self.thermodynamics.w_high(tm_shock).unwrap_or(f64::NAN);
            w_high_tn * xi_shock / (1.0 - xi_shock * xi_shock)
                - w_high_tm * boost_velocity(xi_shock, vm_shock) * gamma_sq(boost_velocity(xi_shock, vm_shock))
        };

        let t_min_hydro = self.t_min_hydro;
        let mut t_min = (self.t_nucl / 2.0).max(t_min_hydro);
        let mut t_max = tm_shock;
        let mut bracket1 = tii_shock(t_min);
        let mut bracket2 = tii_shock(t_max);
        while bracket1 * bracket2 > 0.0 && t_min > t_min_hydro {
            t_max = t_min;
            bracket2 = bracket1;
            t_min = (t_min / 1.5).max(t_min_hydro);
            bracket1 = tii_shock(t_min);
        }

        if bracket1 * bracket2 <= 0.0 {
            root::brent(tii_shock, t_min, t_max, self.atol, 200)
        } else {
            root::secant(tii_shock, self.t_nucl, tm_shock, self.atol, 200)
        }
        .map_err(|_| HydroError::ShockNotBracketed { vw })
    }

    /// Smallest nucleation temperature possible at `vw`: the shock strength
    /// that pushes `T-` all the way down to `TMinHydro` with `v+ = 0`.
    pub fn strongest_shock(&self, vw: f64) -> f64 {
        let matching_strongest = |tp: f64| -> f64 {
            self.thermodynamics.p_high(tp).unwrap_or(f64::NAN)
                - self
                    .thermodynamics
                    .p_low(self.t_min_hydro)
                    .unwrap_or(f64::NAN)
        };
        let Ok(tp_strongest) = root::brent(
            matching_strongest,
            self.t_min_hydro,
            self.t_max_hydro,
            self.atol,
            200,
        ) else {
            return 0.0;
        };
        self.solve_hydro_shock(vw, 0.0, tp_strongest).unwrap_or(0.0)
    }

    /// Smallest `v_w` for which a deflagration/hybrid exists at this model's
    /// nucleation temperature.
    pub fn min_velocity(&self) -> Result<f64> {
        let strongest_shock_tn = |vw: f64| -> f64 { self.strongest_shock(vw) - self.t_nucl };
        root::brent(strongest_shock_tn, self.v_bracket_low, self.v_jouguet, self.atol, 200)
            .or(Ok(0.0))
    }

    /// Branch dispatch: detonation for `vw > vJ`, otherwise a 1-D search
    /// over `v+` so that the shock front reproduces the nucleation
    /// temperature.
    pub fn find_matching(&mut self, vw_try: f64) -> Result<MatchingPoint> {
        if vw_try > self.v_jouguet {
            return self.match_deton(vw_try);
        }

        let vp_min = self.v_bracket_low;
        let csq_high_n = self.thermodynamics.csq_high(self.t_nucl)?;
        let mut vp_max = (vw_try).min(csq_high_n / vw_try);

        let shock_tn_diff = |engine: &mut Self, vp_try: f64| -> f64 {
            match engine.match_deflag_or_hyb(vw_try, Some(vp_try)) {
                Ok(point) => engine
                    .solve_hydro_shock(vw_try, vp_try, point.tp)
                    .map(|tn| tn - engine.t_nucl)
                    .unwrap_or(f64::NAN),
                Err(_) => f64::NAN,
            }
        };

        let mut diff_min = shock_tn_diff(self, vp_min);
        let mut diff_max = shock_tn_diff(self, vp_max);

        if diff_min * diff_max > 0.0 {
            let solve_vp_max = |engine: &mut Self, vp_try: f64| -> f64 {
                match engine.match_deflag_or_hyb(vw_try, Some(vp_try)) {
                    Ok(point) => {
                        let csq_high =
                            engine.thermodynamics.csq_high(point.tp).unwrap_or(f64::NAN);
                        vp_try - csq_high / vw_try
                    }
                    Err(_) => f64::NAN,
                }
            };
            let atol = self.atol;
            if solve_vp_max(self, vw_try) * solve_vp_max(self, vp_max) <= 0.0 {
                if let Ok(new_vp_max) =
                    root::brent(|v| solve_vp_max(self, v), vp_max, vw_try, atol, 100)
                {
                    vp_max = new_vp_max;
                    diff_max = shock_tn_diff(self, vp_max);
                }
            }
        }

        let atol = self.atol;
        let vp_solution = if diff_min * diff_max <= 0.0 {
            root::brent(|v| shock_tn_diff(self, v), vp_min, vp_max, atol, 200)
                .map_err(|_| HydroError::MatchingFailure {
                    vw: vw_try,
                    attempted: "deflagration/hybrid shock v+ bracket".into(),
                })?
        } else {
            let sign = diff_max.signum();
            let extremum = golden_section_minimize(
                |v| sign * shock_tn_diff(self, v),
                vp_min,
                vp_max,
                60,
            );
            let extremum_value = sign * shock_tn_diff(self, extremum);
            if extremum_value > 0.0 {
                let vw_template = if vw_try <= self.v_jouguet {
                    vw_try.min(self.template.v_jouguet() - 1e-6)
                } else {
                    vw_try.max(self.template.v_jouguet() + 1e-6)
                };
                let (vp, vm, tp, tm) = self.template.find_matching(self.t_nucl, vw_template);
                return Ok(MatchingPoint { vp, vm, tp, tm });
            }
            root::brent(|v| shock_tn_diff(self, v), vp_min, extremum, atol, 200)
                .map_err(|_| HydroError::MatchingFailure {
                    vw: vw_try,
                    attempted: "deflagration/hybrid shock v+ bracket (extremum branch)".into(),
                })?
        };

        self.match_deflag_or_hyb(vw_try, Some(vp_solution))
    }

    /// Boundary conditions `(c1, c2, Tp, Tm, velocityMid)` for the scalar
    /// and plasma equations of motion, in the EOM's sign convention.
    pub fn find_hydro_boundaries(&mut self, vw_try: f64) -> Result<HydroBoundaries> {
        if vw_try < self.v_min {
            return Err(HydroError::BelowMinimumVelocity {
                vw: vw_try,
                v_min: self.v_min,
            });
        }
        let point = self.find_matching(vw_try)?;
        let w_high = self.thermodynamics.w_high(point.tp)?;
        let c1 = -w_high * gamma_sq(point.vp) * point.vp;
        let c2 = self.thermodynamics.p_high(point.tp)? + w_high * gamma_sq(point.vp) * point.vp.powi(2);
        let velocity_mid = -0.5 * (point.vm + point.vp);
        Ok(HydroBoundaries {
            c1,
            c2,
            tp: point.tp,
            tm: point.tm,
            velocity_mid,
        })
    }

    /// Wall velocity in local thermal equilibrium: solves
    /// `T+ gamma+ = T- gamma-` over `[vMin, vJ - eps]`. Returns `1` if the
    /// transition is too strong for a solution to exist (LTE runaway), `0`
    /// if it is too weak.
    pub fn find_vw_lte(&mut self) -> Result<f64> {
        let v_min = self.v_min;
        let v_max_cap = self.v_jouguet - 1e-10;

        let shock_tn_diff = |engine: &mut Self, vw: f64| -> f64 {
            match engine.match_deflag_or_hyb(vw, None) {
                Ok(point) => engine
                    .solve_hydro_shock(vw, point.vp, point.tp)
                    .map(|tn| tn - engine.t_nucl)
                    .unwrap_or(f64::NAN),
                Err(_) => f64::NAN,
            }
        };
        let shock = |engine: &mut Self, vw: f64| -> f64 {
            match engine.match_deflag_or_hyb(vw, None) {
                Ok(point) => {
                    let csq_high = engine.thermodynamics.csq_high(point.tp).unwrap_or(f64::NAN);
                    point.vp * vw - csq_high
                }
                Err(_) => f64::NAN,
            }
        };

        let atol = self.atol;
        let v_jouguet = self.v_jouguet;
        let mut v_max = v_max_cap;
        if shock(self, v_max) > 0.0 {
            let csq_high_n = self.thermodynamics.csq_high(self.t_nucl)?;
            match root::brent(
                |v| shock(self, v),
                csq_high_n.max(0.0).sqrt(),
                v_jouguet,
                atol,
                100,
            ) {
                Ok(root) => v_max = root - 1e-6,
                Err(_) => return Ok(1.0),
            }
        }

        let diff_max = shock_tn_diff(self, v_max);
        if diff_max > 0.0 || !self.last_match_converged {
            return Ok(1.0);
        }
        let diff_min = shock_tn_diff(self, v_min);
        if diff_min < 0.0 {
            return Ok(0.0);
        }

        root::brent(|v| shock_tn_diff(self, v), v_min, v_max, atol, 200)
            .map_err(|err| HydroError::MatchingFailure {
                vw: v_max,
                attempted: format!("findvwLTE: {err}"),
            })
    }
}

/// Golden-section search for the minimizer of `f` on `[lo, hi]`, used for
/// the `findMatching` extremum branch (the Rust analogue of
/// `scipy.optimize.minimize_scalar(method="Bounded")`).
fn golden_section_minimize(mut f: impl FnMut(f64) -> f64, lo: f64, hi: f64, iterations: usize) -> f64 {
    let phi = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut a = lo;
    let mut b = hi;
    let mut c = b - phi * (b - a);
    let mut d = a + phi * (b - a);
    for _ in 0..iterations {
        if f(c) < f(d) {
            b = d;
        } else {
            a = c;
        }
        c = b - phi * (b - a);
        d = a + phi * (b - a);
    }
    0.5 * (a + b)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use wallspeed_potential::{EffectivePotential, FreeEnergy};

    /// A constant-sound-speed bag phase, `c_s^2 = 1/3`, with transition
    /// strength fixed by `a_high / a_low`.
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

    fn bag_hydro() -> Hydrodynamics {
        // `v_eff = -a*T^4` at the traced minimum: the low phase needs the
        // larger `a` to be the deeper, true vacuum.
        let high = bag_free_energy(1.0);
        let low = bag_free_energy(1.2);
        let thermo = Thermodynamics::new(high, low, 100.0);
        Hydrodynamics::new(thermo, 3.0, 0.2, 1e-6, 1e-6).unwrap()
    }

    #[test]
    fn jouguet_velocity_lies_between_sound_speed_and_one() {
        let hydro = bag_hydro();
        assert!(hydro.v_jouguet() > (1.0 / 3.0_f64).sqrt() - 1e-3);
        assert!(hydro.v_jouguet() < 1.0);
    }

    #[test]
    fn jouguet_stationarity_holds_at_the_solved_root() {
        let hydro = bag_hydro();
        let p_high_n = hydro.thermodynamics.p_high(hydro.t_nucl).unwrap();
        let e_high_n = hydro.thermodynamics.e_high(hydro.t_nucl).unwrap();
        let vp_sq = |tm: f64| -> f64 {
            let p_low = hydro.thermodynamics.p_low(tm).unwrap();
            let e_low = hydro.thermodynamics.e_low(tm).unwrap();
            (p_high_n - p_low) * (p_high_n + e_low) / (e_high_n - e_low) / (e_high_n + p_low)
        };
        let h = 1e-4;
        let derivative_at = |tm: f64| (vp_sq(tm + h) - vp_sq(tm - h)) / (2.0 * h);

        let t_min = hydro.t_nucl;
        let t_max = (2.0 * t_min)
            .max(hydro.thermodynamics.max_possible_temperature_low())
            .min(hydro.t_max_hydro);
        let tm_sol = root::brent(derivative_at, t_min, t_max, hydro.atol, 200).unwrap();

        // At the actual solved root, the Jouguet point is a genuine
        // stationarity point of v+^2 with respect to T-, and its value
        // must match the velocity the engine itself reports.
        assert!(derivative_at(tm_sol).abs() < 1e-6, "derivative={}", derivative_at(tm_sol));
        let reported = hydro.v_jouguet().powi(2);
        assert!(
            (vp_sq(tm_sol) - reported).abs() / reported < 1e-3,
            "vp_sq(tm_sol)={}, reported={reported}",
            vp_sq(tm_sol)
        );
    }

    #[test]
    fn detonation_matching_recovers_vp_equal_to_wall_velocity() {
        let mut hydro = bag_hydro();
        let vw = (hydro.v_jouguet() + 1.0) / 2.0;
        let point = hydro.match_deton(vw).unwrap();
        assert!((point.vp - vw).abs() < 1e-9);
        assert!((point.tp - hydro.t_nucl).abs() < 1e-9);
    }
}
