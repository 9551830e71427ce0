//! Loading, interpolation, basis transforms and decay-length estimation
//! for the precomputed linearized collision operator.

pub mod collision_array;
pub mod container;
pub mod error;
pub mod resample;

pub use collision_array::CollisionArray;
pub use error::{CollisionError, Result};
