//! Fluid matching, Jouguet velocity and shock-front solver.
//!
//! Given the traced free energies of the two phases either side of the
//! wall and a nucleation temperature, [`Hydrodynamics`] answers: what are
//! the fluid velocities and temperatures either side of a wall moving at
//! `v_w`, and (for deflagrations/hybrids) what temperature does the
//! self-similar shock profile predict far ahead of the wall.

pub mod error;
pub mod hydrodynamics;
pub mod phase_info;
pub mod template_model;
pub mod thermodynamics;

pub use error::{HydroError, Result};
pub use hydrodynamics::{Hydrodynamics, HydroBoundaries, MatchingPoint};
pub use phase_info::PhaseInfo;
pub use template_model::TemplateModel;
pub use thermodynamics::{Thermodynamics, ThermodynamicsExtrapolate};
