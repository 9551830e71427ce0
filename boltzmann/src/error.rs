#[derive(thiserror::Error, Debug)]
pub enum BoltzmannError {
    #[error("Boltzmann operator for particle '{particle}' is singular and cannot be solved")]
    SingularOperator { particle: String },

    #[error(transparent)]
    Grid(#[from] wallspeed_grid::GridError),

    #[error(transparent)]
    Collision(#[from] wallspeed_collision::CollisionError),
}

pub type Result<T> = std::result::Result<T, BoltzmannError>;
