#[derive(thiserror::Error, Debug)]
pub enum PotentialError {
    #[error("findCriticalTemperature needs t_min < t_max, got t_min={t_min}, t_max={t_max}")]
    InvalidTemperatureRange { t_min: f64, t_max: f64 },

    #[error("could not find a critical temperature in [{t_min}, {t_max}]")]
    CriticalTemperatureNotBracketed { t_min: f64, t_max: f64 },

    #[error("local minimization did not converge: {0}")]
    MinimizationFailed(#[from] wallspeed_numerics::NumericsError),

    #[error("starting phase at T={t} is not a stable minimum (Hessian is not positive- or negative-definite)")]
    UnstableStartingPhase { t: f64 },

    #[error("phase trace failed: {reason}")]
    PhaseTraceFailed { reason: String },

    #[error("phase trace produced an empty or inverted temperature range (min={min}, max={max})")]
    EmptyTemperatureRange { min: f64, max: f64 },

    #[error(transparent)]
    Grid(#[from] wallspeed_grid::GridError),
}

pub type Result<T> = std::result::Result<T, PotentialError>;
