//! A bag-equation-of-state fallback model: constant sound speeds
//! `c_{s,broken}^2`, `c_{s,symmetric}^2` and a single transition-strength
//! parameter `al` (the bag model's `alpha_n`), used only when the full
//! free-energy-based matching fails to converge or bracket a root. Grounded
//! on the closed-form bag relations in `WallSpeedLTETemplate.py`
//! (`getvm`, `getal`, `getvp`, `jouguet`), evaluated analytically rather
//! than by that file's numerical shooting/bisection scan.

use crate::error::{HydroError, Result};

/// `mu(a, b) = (a - b) / (1 - a b)`, the relative-velocity boost used
/// throughout the matching relations.
pub fn boost_velocity(xi: f64, v: f64) -> f64 {
    (xi - v) / (1.0 - xi * v)
}

pub fn gamma_sq(v: f64) -> f64 {
    1.0 / (1.0 - v * v)
}

/// Closed-form bag-model fallback, built once at `Tnucl` from the actual
/// thermodynamic functions and held fixed afterwards.
pub struct TemplateModel {
    al: f64,
    cs2b: f64,
    cs2s: f64,
    v_jouguet: f64,
}

impl TemplateModel {
    /// `al` is the bag transition strength `(e_n - 3 p_n) / (3 w_n)`
    /// evaluated in the low-temperature phase at `Tnucl`; `cs2b`/`cs2s` are
    /// the broken/symmetric sound speeds squared at `Tnucl`.
    pub fn new(al: f64, cs2b: f64, cs2s: f64) -> Self {
        let v_jouguet = jouguet_velocity(al, cs2b);
        Self {
            al,
            cs2b,
            cs2s,
            v_jouguet,
        }
    }

    pub fn al(&self) -> f64 {
        self.al
    }

    pub fn cs2b(&self) -> f64 {
        self.cs2b
    }

    pub fn v_jouguet(&self) -> f64 {
        self.v_jouguet
    }

    pub fn v_min(&self) -> f64 {
        self.cs2b.max(0.0).sqrt()
    }

    /// `getvm`: for `vw` below the sound speed the transition is a pure
    /// deflagration (`vm = vw`); otherwise solves the quadratic matching
    /// relation for `vm` given `vw` and `al`.
    pub fn vm_of_vw(&self, vw: f64) -> f64 {
        if vw * vw < self.cs2b {
            return vw;
        }
        let cc = 1.0 - 3.0 * self.al + vw * vw * (1.0 / self.cs2b + 3.0 * self.al);
        let disc = -4.0 * vw * vw / self.cs2b + cc * cc;
        if disc < 0.0 || cc < 0.0 {
            return self.cs2b.sqrt();
        }
        (cc + disc.sqrt()) / 2.0 * self.cs2b / vw
    }

    /// `getal`: the transition strength `al+` implied by a given `(vp, vm)`.
    pub fn al_of_vpvm(&self, vp: f64, vm: f64) -> f64 {
        (vp / vm - 1.0) * (vp * vm / self.cs2b - 1.0) / (1.0 - vp * vp) / 3.0
    }

    /// Analytic initial guess `[Tp0, Tm0]` for the tan-mapped Newton solve
    /// in `matchDeflagOrHyb`, built from this template model's `vm(vw)` and
    /// the bag-model enthalpy ratio `T+/T- = ((w+/w-) (1-vm^2)/(1-vp^2))^{1/4}`-like
    /// scaling, with `w+/w- ~ 1 + al` as a leading-order approximation.
    pub fn match_deflag_or_hyb_initial(
        &self,
        t_nucleation: f64,
        vw: f64,
        vp: Option<f64>,
    ) -> Result<[f64; 2]> {
        if vw <= 0.0 {
            return Err(HydroError::MatchingFailure {
                vw,
                attempted: "template initial guess requires vw > 0".into(),
            });
        }
        let vm = self.vm_of_vw(vw.min(self.v_jouguet - 1e-9));
        let vp = vp.unwrap_or_else(|| (self.cs2s / vw).min(vw));
        let ratio = ((1.0 + self.al) * (1.0 - vm * vm) / (1.0 - vp * vp).max(1e-12))
            .max(1e-12)
            .powf(0.25);
        let tm0 = t_nucleation;
        let tp0 = (tm0 * ratio).max(1.01 * tm0);
        Ok([tp0, tm0])
    }

    /// `matchDeton` restricted to the bag model, used as the template-model
    /// fallback when the free-energy-based detonation match fails: since
    /// `vp = vw` and `Tp = Tn`, only `vm` is needed.
    pub fn match_deton(&self, t_nucleation: f64, vw: f64) -> (f64, f64, f64, f64) {
        let vm = self.vm_of_vw(vw);
        let ratio = ((1.0 + self.al) * (1.0 - vm * vm) / (1.0 - vw * vw).max(1e-12))
            .max(1e-12)
            .powf(0.25);
        (vw, vm, t_nucleation, t_nucleation / ratio)
    }

    /// Bag-model fallback for `findMatching`: dispatches on `vwTry` versus
    /// `vJ` exactly as the full solver does.
    pub fn find_matching(&self, t_nucleation: f64, vw_try: f64) -> (f64, f64, f64, f64) {
        if vw_try > self.v_jouguet {
            self.match_deton(t_nucleation, vw_try)
        } else {
            let vm = self.vm_of_vw(vw_try);
            let vp = (self.cs2s / vw_try).min(vw_try);
            let ratio = ((1.0 + self.al) * (1.0 - vm * vm) / (1.0 - vp * vp).max(1e-12))
                .max(1e-12)
                .powf(0.25);
            let tm = t_nucleation;
            let tp = tm * ratio;
            (vp, vm, tp, tm)
        }
    }
}

/// Solves `disc(vw) = -4 vw^2 / cs2b + cc(vw)^2 = 0` for the smallest root
/// `vw in (sqrt(cs2b), 1)`, where `cc(vw) = 1 - 3 al + vw^2 (1/cs2b + 3 al)`.
/// Expanding gives a quadratic in `x = vw^2`:
/// `A^2 x^2 + [2(1-3al)A - 4/cs2b] x + (1-3al)^2 = 0`, `A = 1/cs2b + 3 al`.
fn jouguet_velocity(al: f64, cs2b: f64) -> f64 {
    let a_coef = 1.0 / cs2b + 3.0 * al;
    let b_lin = 1.0 - 3.0 * al;
    let quad_a = a_coef * a_coef;
    let quad_b = 2.0 * b_lin * a_coef - 4.0 / cs2b;
    let quad_c = b_lin * b_lin;
    let discriminant = quad_b * quad_b - 4.0 * quad_a * quad_c;
    if discriminant < 0.0 || quad_a.abs() < 1e-300 {
        return (cs2b.sqrt() + 1.0) / 2.0;
    }
    let sqrt_disc = discriminant.sqrt();
    let x1 = (-quad_b + sqrt_disc) / (2.0 * quad_a);
    let x2 = (-quad_b - sqrt_disc) / (2.0 * quad_a);
    let cs_b = cs2b.sqrt();
    [x1, x2]
        .into_iter()
        .filter(|&x| x.is_finite() && x > 0.0)
        .map(|x| x.sqrt())
        .filter(|&v| v > cs_b && v < 1.0)
        .fold(1.0, f64::min)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn jouguet_velocity_is_above_sound_speed_and_below_one() {
        let model = TemplateModel::new(0.1, 1.0 / 3.0, 1.0 / 3.0);
        assert!(model.v_jouguet() > (1.0 / 3.0_f64).sqrt());
        assert!(model.v_jouguet() < 1.0);
    }

    #[test]
    fn vm_of_vw_equals_vw_for_deflagration() {
        let model = TemplateModel::new(0.1, 1.0 / 3.0, 1.0 / 3.0);
        let vw = 0.3;
        assert!((model.vm_of_vw(vw) - vw).abs() < 1e-12);
    }

    #[test]
    fn jouguet_velocity_grows_with_transition_strength() {
        let weak = TemplateModel::new(0.01, 1.0 / 3.0, 1.0 / 3.0);
        let strong = TemplateModel::new(0.5, 1.0 / 3.0, 1.0 / 3.0);
        assert!(strong.v_jouguet() > weak.v_jouguet());
    }
}
