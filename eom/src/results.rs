//! The terminal record handed back to the caller once the outer loop
//! reaches `DONE`.

#[derive(Debug, Clone)]
pub struct WallGoResults {
    pub wall_velocity: f64,
    pub wall_velocity_error: f64,
    pub wall_widths: Vec<f64>,
    pub wall_offsets: Vec<f64>,
    pub temperature_plus: f64,
    pub temperature_minus: f64,
    pub delta_00: Vec<f64>,
    pub delta_02: Vec<f64>,
    pub delta_20: Vec<f64>,
    pub delta_11: Vec<f64>,
    pub has_out_of_equilibrium: bool,
    /// Non-fatal `NumericalWarning` diagnostics accumulated during the
    /// solve (ill-conditioned Boltzmann operators, wall widths close to
    /// the configured maximum), attached here rather than returned as an
    /// error.
    pub numerical_warnings: Vec<String>,
}
