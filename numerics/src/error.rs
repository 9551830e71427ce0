#[derive(thiserror::Error, Debug)]
pub enum NumericsError {
    #[error("could not bracket a root in [{lo}, {hi}]: f(lo)={f_lo}, f(hi)={f_hi} have the same sign")]
    NoBracket { lo: f64, hi: f64, f_lo: f64, f_hi: f64 },

    #[error("root refinement did not converge within {max_iter} iterations (last residual {residual:e})")]
    RootNotConverged { max_iter: usize, residual: f64 },

    #[error("minimization did not converge within {max_iter} iterations (last simplex size {size:e})")]
    MinimizationNotConverged { max_iter: usize, size: f64 },

    #[error("Levenberg-Marquardt fit did not converge within {max_iter} iterations (last cost {cost:e})")]
    LevenbergMarquardtNotConverged { max_iter: usize, cost: f64 },

    #[error("IVP integration failed: {reason} at t={t}")]
    IntegrationFailed { reason: String, t: f64 },

    #[error("IVP step size shrunk below the minimum allowed ({step:e} at t={t})")]
    StepSizeCollapsed { step: f64, t: f64 },
}

pub type Result<T> = std::result::Result<T, NumericsError>;
