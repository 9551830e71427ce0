//! Effective-potential contract and free-energy phase tracing: the two
//! "external collaborator" interfaces the core numerical engine is built
//! against, plus a small toy model used to exercise them in tests.

pub mod effective_potential;
pub mod error;
pub mod free_energy;
pub mod toy;

pub use effective_potential::EffectivePotential;
pub use error::{PotentialError, Result};
pub use free_energy::{FreeEnergy, FreeEnergyValue};
