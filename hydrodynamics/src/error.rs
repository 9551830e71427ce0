#[derive(thiserror::Error, Debug)]
pub enum HydroError {
    #[error("failed to bracket or converge on the Jouguet velocity: {reason}")]
    JouguetNotBracketed { reason: String },

    #[error("matching equations have no solution for vw={vw} (tried {attempted})")]
    MatchingFailure { vw: f64, attempted: String },

    #[error("temperature went negative during shock integration at v={v}, xi={xi}")]
    ShockTemperatureNegative { v: f64, xi: f64 },

    #[error("could not bracket the shock-front nucleation temperature for vw={vw}")]
    ShockNotBracketed { vw: f64 },

    #[error("wall velocity {vw} is below the minimum admissible velocity {v_min} for this nucleation temperature")]
    BelowMinimumVelocity { vw: f64, v_min: f64 },

    #[error("low-temperature phase has higher free energy ({v_low}) than the high-temperature phase ({v_high}) at the nucleation temperature {t_nucl}: not a valid transition")]
    InverseTransition {
        t_nucl: f64,
        v_high: f64,
        v_low: f64,
    },

    #[error(transparent)]
    Potential(#[from] wallspeed_potential::PotentialError),

    #[error(transparent)]
    Numerics(#[from] wallspeed_numerics::NumericsError),
}

pub type Result<T> = std::result::Result<T, HydroError>;
