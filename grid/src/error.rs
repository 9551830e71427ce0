#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// `N` (momentum basis size) must be odd.
    #[error("GridConfigError: momentum grid size N={n} must be odd")]
    EvenMomentumGridSize { n: usize },

    /// `M` (spatial basis size) must be at least 2 to have an interior.
    #[error("GridConfigError: spatial grid size M={m} is too small")]
    SpatialGridTooSmall { m: usize },

    /// A length scale used by the compactification map was non-positive.
    #[error("GridConfigError: length scale '{name}' must be positive, got {value}")]
    NonPositiveScale { name: &'static str, value: f64 },

    /// Shape of a [`crate::Polynomial`] tensor did not match its tagged axes.
    #[error("Polynomial shape mismatch: tensor has shape {actual:?}, axes require {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Tried to combine two axis tags that cannot be combined (e.g. basis change
    /// between axes of different rank).
    #[error("Axis mismatch: {0}")]
    AxisMismatch(String),

    /// A point fell outside `[-1, 1]` during evaluation without extrapolation.
    #[error("evaluation point {x} outside [-1, 1] and extrapolation was not enabled")]
    OutsideDomain { x: f64 },
}

pub type Result<T> = std::result::Result<T, GridError>;
