//! Linearized Boltzmann operator: assembly, dense solve, and the velocity
//! moments the equation-of-motion residual needs.

pub mod background;
pub mod error;
pub mod moments;
pub mod operator;
pub mod particle;
pub mod solver;

pub use background::BoltzmannBackground;
pub use error::{BoltzmannError, Result};
pub use moments::Moments;
pub use particle::{Particle, Statistics};
pub use solver::{BoltzmannSolver, ParticleSolution, ILL_CONDITIONED_THRESHOLD};
