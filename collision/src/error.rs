#[derive(thiserror::Error, Debug)]
pub enum CollisionError {
    #[error("I/O error reading collision container: {0}")]
    Io(#[from] std::io::Error),

    #[error("collision container is corrupt: {0}")]
    Corrupt(String),

    #[error("collision tensor must have rank 4, got rank {rank}")]
    RankMismatch { rank: usize },

    #[error(
        "file basis size N_file={n_file} is smaller than the target N={n_target} and interpolation was not enabled"
    )]
    TargetGridLarger { n_file: usize, n_target: usize },

    #[error(transparent)]
    Grid(#[from] wallspeed_grid::GridError),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
