#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] wallspeed_grid::GridError),

    #[error(transparent)]
    Potential(#[from] wallspeed_potential::PotentialError),

    #[error(transparent)]
    Collision(#[from] wallspeed_collision::CollisionError),

    #[error(transparent)]
    Hydro(#[from] wallspeed_hydrodynamics::HydroError),

    #[error(transparent)]
    Boltzmann(#[from] wallspeed_boltzmann::BoltzmannError),

    #[error(transparent)]
    Eom(#[from] wallspeed_eom::EomError),

    #[error(transparent)]
    Numerics(#[from] wallspeed_numerics::NumericsError),
}

pub type Result<T> = std::result::Result<T, Error>;
