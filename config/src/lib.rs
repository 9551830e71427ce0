//! Reads the solver's configuration parameters from a TOML file, or falls
//! back to documented defaults if none is found.
//!
//! Mirrors the shape of the config keys in spec section 6: one section per
//! component, dotted key names become nested tables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Candidate locations searched when no explicit path is given, so the
/// config is discoverable from crates nested a few directories deep.
const SEARCH_PATH: [&str; 3] = ["./config.toml", "../config.toml", "../../config.toml"];

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct PolynomialGridConfig {
    /// `M`: number of spatial basis points.
    pub spatial_grid_size: usize,
    /// `N`: momentum basis size. Must be odd (checked at `Grid` construction).
    pub momentum_grid_size: usize,
    /// Default wall length scale `L_xi` used by the tanh compactification map.
    pub l_xi: f64,
}

impl Default for PolynomialGridConfig {
    fn default() -> Self {
        Self {
            spatial_grid_size: 20,
            momentum_grid_size: 11,
            l_xi: 5.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct EffectivePotentialConfig {
    /// Finite-difference step in temperature for `derivT`.
    pub d_t: f64,
    /// Finite-difference step in field space for `derivField`.
    pub d_phi: f64,
    /// Relative tolerance `rTol` used by the free-energy IVP integrator.
    pub phase_tracer_tol: f64,
}

impl Default for EffectivePotentialConfig {
    fn default() -> Self {
        Self {
            d_t: 1e-3,
            d_phi: 1e-3,
            phase_tracer_tol: 1e-8,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct EomConfig {
    /// Relative tolerance on the Levenberg-Marquardt wall-parameter fit.
    pub err_tol: f64,
    /// Iteration cap for the wall-parameter fit.
    pub max_iterations: usize,
    /// Relative tolerance on the net pressure root-find.
    pub press_rel_err_tol: f64,
}

impl Default for EomConfig {
    fn default() -> Self {
        Self {
            err_tol: 1e-3,
            max_iterations: 50,
            press_rel_err_tol: 1e-3,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct HydrodynamicsConfig {
    /// Upper multiplier on `T_n` bounding the hydrodynamic search window.
    pub tmax: f64,
    /// Lower multiplier on `T_n` bounding the hydrodynamic search window.
    pub tmin: f64,
    /// Relative tolerance for the matching and shock root-finds. Distinct
    /// from `effective_potential.phase_tracer_tol`.
    pub rel_tol: f64,
    /// Absolute tolerance for the matching and shock root-finds.
    pub abs_tol: f64,
}

impl Default for HydrodynamicsConfig {
    fn default() -> Self {
        Self {
            tmax: 10.0,
            tmin: 0.01,
            rel_tol: 1e-6,
            abs_tol: 1e-6,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DataFilesConfig {
    /// Path to the tabulated bosonic thermal integral `J_b`.
    pub interpolation_table_jb: Option<PathBuf>,
    /// Path to the tabulated fermionic thermal integral `J_f`.
    pub interpolation_table_jf: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub polynomial_grid: PolynomialGridConfig,
    pub effective_potential: EffectivePotentialConfig,
    pub eom: EomConfig,
    pub hydrodynamics: HydrodynamicsConfig,
    pub data_files: DataFilesConfig,
}

impl Config {
    /// Loads configuration from `path`, or searches [`SEARCH_PATH`] if `path`
    /// is `None`, falling back to [`Config::default`] if nothing is found or
    /// parsing fails.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            return Self::from_file(path).unwrap_or_else(|err| {
                eprintln!("Ignoring invalid config file '{}': {err}", path.display());
                Self::default()
            });
        }

        for candidate in SEARCH_PATH {
            let candidate = PathBuf::from(candidate);
            if candidate.exists() {
                match Self::from_file(&candidate) {
                    Ok(config) => return config,
                    Err(err) => {
                        eprintln!(
                            "Ignoring invalid config file '{}': {err}",
                            candidate.display()
                        );
                    }
                }
            }
        }
        eprintln!("Could not find config.toml, using default configuration.");
        Self::default()
    }

    fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
        toml::from_str(&text).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.polynomial_grid.spatial_grid_size, 20);
        assert_eq!(config.polynomial_grid.momentum_grid_size, 11);
        assert_eq!(config.eom.max_iterations, 50);
    }

    #[test]
    fn load_falls_back_to_default_when_missing() {
        let config = Config::load(Some(Path::new("/nonexistent/path/config.toml")));
        assert_eq!(config.polynomial_grid.spatial_grid_size, 20);
    }

    #[test]
    fn load_parses_partial_toml_with_defaults() {
        let dir = std::env::temp_dir().join("wallspeed_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[eom]\nmax_iterations = 7\n").unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.eom.max_iterations, 7);
        assert_eq!(config.polynomial_grid.spatial_grid_size, 20);
    }
}
