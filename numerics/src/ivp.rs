//! Embedded Runge-Kutta-Fehlberg 4(5) initial-value-problem integrator with
//! adaptive step size and optional terminal event detection.
//!
//! Used by the free-energy phase tracer and the hydrodynamic shock solver,
//! both of which need the same shape of integrator: a vector right-hand
//! side, a stopping event (spinodal eigenvalue, shock front), and a step
//! budget.

use nalgebra::DVector;

/// Named Butcher-tableau constants for the Fehlberg RKF4(5) pair.
mod tableau {
    pub const C2: f64 = 1.0 / 4.0;
    pub const C3: f64 = 3.0 / 8.0;
    pub const C4: f64 = 12.0 / 13.0;
    pub const C5: f64 = 1.0;
    pub const C6: f64 = 1.0 / 2.0;

    pub const A21: f64 = 1.0 / 4.0;

    pub const A31: f64 = 3.0 / 32.0;
    pub const A32: f64 = 9.0 / 32.0;

    pub const A41: f64 = 1932.0 / 2197.0;
    pub const A42: f64 = -7200.0 / 2197.0;
    pub const A43: f64 = 7296.0 / 2197.0;

    pub const A51: f64 = 439.0 / 216.0;
    pub const A52: f64 = -8.0;
    pub const A53: f64 = 3680.0 / 513.0;
    pub const A54: f64 = -845.0 / 4104.0;

    pub const A61: f64 = -8.0 / 27.0;
    pub const A62: f64 = 2.0;
    pub const A63: f64 = -3544.0 / 2565.0;
    pub const A64: f64 = 1859.0 / 4104.0;
    pub const A65: f64 = -11.0 / 40.0;

    // 4th-order solution weights.
    pub const B1: f64 = 25.0 / 216.0;
    pub const B3: f64 = 1408.0 / 2565.0;
    pub const B4: f64 = 2197.0 / 4104.0;
    pub const B5: f64 = -1.0 / 5.0;

    // 5th-order (embedded) solution weights.
    pub const B1E: f64 = 16.0 / 135.0;
    pub const B3E: f64 = 6656.0 / 12825.0;
    pub const B4E: f64 = 28561.0 / 56430.0;
    pub const B5E: f64 = -9.0 / 50.0;
    pub const B6E: f64 = 2.0 / 55.0;
}

/// Integrator state, mirroring the RUNNING/FINISHED/EVENT/ERROR lifecycle
/// of a synchronous ODE stepper.
#[derive(Debug, Clone, PartialEq)]
pub enum IvpStatus {
    Running,
    Finished,
    Event { t: f64 },
    Error(String),
}

/// An embedded RKF4(5) integrator over a vector state `y(t)`, stepping
/// towards `t_end` with adaptive step-size control, and an optional event
/// function whose zero crossing terminates the integration early.
pub struct IvpSolver<'a> {
    rhs: Box<dyn FnMut(f64, &DVector<f64>) -> DVector<f64> + 'a>,
    event: Option<Box<dyn FnMut(f64, &DVector<f64>) -> f64 + 'a>>,
    t: f64,
    y: DVector<f64>,
    t_end: f64,
    rtol: f64,
    atol: f64,
    step_size: f64,
    min_step: f64,
    status: IvpStatus,
    last_event_value: Option<f64>,
}

impl<'a> IvpSolver<'a> {
    pub fn new(
        rhs: impl FnMut(f64, &DVector<f64>) -> DVector<f64> + 'a,
        t0: f64,
        y0: DVector<f64>,
        t_end: f64,
        rtol: f64,
        atol: f64,
        max_step: f64,
    ) -> Self {
        Self {
            rhs: Box::new(rhs),
            event: None,
            t: t0,
            y: y0,
            t_end,
            rtol,
            atol,
            step_size: max_step,
            min_step: max_step.abs() * 1e-12,
            status: IvpStatus::Running,
            last_event_value: None,
        }
    }

    pub fn with_event(mut self, event: impl FnMut(f64, &DVector<f64>) -> f64 + 'a) -> Self {
        self.event = Some(Box::new(event));
        self
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Overrides the current state, used by callers that re-solve an
    /// implicit constraint (e.g. a "paranoid" re-minimization) after each
    /// accepted step.
    pub fn set_y(&mut self, y: DVector<f64>) {
        self.y = y;
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn status(&self) -> &IvpStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, IvpStatus::Running)
    }

    /// Advances one adaptive step, shrinking towards `t_end` on the final
    /// step so the integrator lands exactly on it.
    pub fn step(&mut self) {
        use tableau::*;

        if !self.is_running() {
            return;
        }

        let direction = if self.t_end >= self.t { 1.0 } else { -1.0 };
        if (self.t_end - self.t).abs() < 1e-14 {
            self.status = IvpStatus::Finished;
            return;
        }
        if self.step_size.abs() > (self.t_end - self.t).abs() {
            self.step_size = (self.t_end - self.t).abs() * direction.signum();
        }
        let mut h = self.step_size.abs() * direction;

        loop {
            let t = self.t;
            let y = &self.y;

            let k1 = (self.rhs)(t, y);
            let k2 = (self.rhs)(t + C2 * h, &(y + h * A21 * &k1));
            let k3 = (self.rhs)(t + C3 * h, &(y + h * (A31 * &k1 + A32 * &k2)));
            let k4 = (self.rhs)(
                t + C4 * h,
                &(y + h * (A41 * &k1 + A42 * &k2 + A43 * &k3)),
            );
            let k5 = (self.rhs)(
                t + C5 * h,
                &(y + h * (A51 * &k1 + A52 * &k2 + A53 * &k3 + A54 * &k4)),
            );
            let k6 = (self.rhs)(
                t + C6 * h,
                &(y + h * (A61 * &k1 + A62 * &k2 + A63 * &k3 + A64 * &k4 + A65 * &k5)),
            );

            let y4 = y + h * (B1 * &k1 + B3 * &k3 + B4 * &k4 + B5 * &k5);
            let y5 = y + h * (B1E * &k1 + B3E * &k3 + B4E * &k4 + B5E * &k5 + B6E * &k6);

            let scale = y.map(|v| self.atol + self.rtol * v.abs());
            let err_norm = ((&y5 - &y4).component_div(&scale))
                .iter()
                .map(|e| e * e)
                .sum::<f64>()
                .sqrt()
                / (y.len() as f64).sqrt();

            if err_norm.is_finite() && err_norm <= 1.0 {
                let t_new = t + h;
                if let Some(event) = self.event.as_mut() {
                    let new_value = event(t_new, &y5);
                    if let Some(old_value) = self.last_event_value {
                        if old_value.signum() != new_value.signum() && old_value != 0.0 {
                            self.status = IvpStatus::Event { t: t_new };
                            self.t = t_new;
                            self.y = y5;
                            return;
                        }
                    }
                    self.last_event_value = Some(new_value);
                }

                self.t = t_new;
                self.y = y5;
                let growth = if err_norm > 0.0 {
                    (0.84 * (1.0 / err_norm).powf(0.25)).clamp(0.1, 5.0)
                } else {
                    5.0
                };
                self.step_size = (h.abs() * growth).min(self.t_end.abs().max(1.0));
                if (self.t_end - self.t).abs() < 1e-14 {
                    self.status = IvpStatus::Finished;
                }
                return;
            }

            let shrink = (0.84 * (1.0 / err_norm).powf(0.25)).clamp(0.1, 0.9);
            h *= shrink;
            if h.abs() < self.min_step {
                self.status = IvpStatus::Error(format!(
                    "step size collapsed to {h:e} at t={t}"
                ));
                return;
            }
        }
    }
}
