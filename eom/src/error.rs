#[derive(thiserror::Error, Debug)]
pub enum EomError {
    #[error("phase trace failed: {reason}")]
    PhaseTraceFailure { reason: String },

    #[error("no deflagration/hybrid solution: net pressure never crosses zero in [{v_min}, {v_max}]")]
    NoDeflagrationSolution { v_min: f64, v_max: f64 },

    #[error("wall width {width} for field {field} is within {margin:.1e} of the configured maximum {max_width}")]
    WallWidthNearMaximum {
        field: usize,
        width: f64,
        max_width: f64,
        margin: f64,
    },

    #[error(transparent)]
    Hydro(#[from] wallspeed_hydrodynamics::HydroError),

    #[error(transparent)]
    Boltzmann(#[from] wallspeed_boltzmann::BoltzmannError),

    #[error(transparent)]
    Potential(#[from] wallspeed_potential::PotentialError),

    #[error(transparent)]
    Numerics(#[from] wallspeed_numerics::NumericsError),

    #[error(transparent)]
    Grid(#[from] wallspeed_grid::GridError),
}

pub type Result<T> = std::result::Result<T, EomError>;
