//! Off-equilibrium particle descriptors: each one contributes its own
//! `(L, S)` pair and its own solved `delta f`.

/// Quantum statistics entering the equilibrium distribution and the `+-`
/// sign in the Liouville/force terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistics {
    FermiDirac,
    BoseEinstein,
}

impl Statistics {
    /// `f_eq(x) = 1 / (e^x -+ 1)`, `x = E/T`.
    pub fn equilibrium(&self, x: f64) -> f64 {
        match self {
            Statistics::FermiDirac => 1.0 / (x.exp() + 1.0),
            Statistics::BoseEinstein => 1.0 / (x.exp() - 1.0),
        }
    }

    /// `d f_eq / dx`.
    pub fn d_equilibrium(&self, x: f64) -> f64 {
        let e = x.exp();
        match self {
            Statistics::FermiDirac => -e / (e + 1.0).powi(2),
            Statistics::BoseEinstein => -e / (e - 1.0).powi(2),
        }
    }
}

/// One particle species tracked out of equilibrium. Vacuum and thermal
/// masses are supplied as closures of the background field values and
/// temperature respectively, mirroring the Python model's `msqVacuum`,
/// `msqDerivative` and `msqThermal` callbacks on `Particle`.
pub struct Particle {
    pub name: String,
    pub statistics: Statistics,
    pub in_equilibrium: bool,
    pub ultrarelativistic: bool,
    pub total_dofs: f64,
    m_sq_vacuum: Box<dyn Fn(&[f64]) -> f64 + Send + Sync>,
    dm_sq_vacuum: Box<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>,
    m_sq_thermal: Box<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl Particle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        statistics: Statistics,
        in_equilibrium: bool,
        ultrarelativistic: bool,
        total_dofs: f64,
        m_sq_vacuum: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
        dm_sq_vacuum: impl Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
        m_sq_thermal: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            statistics,
            in_equilibrium,
            ultrarelativistic,
            total_dofs,
            m_sq_vacuum: Box::new(m_sq_vacuum),
            dm_sq_vacuum: Box::new(dm_sq_vacuum),
            m_sq_thermal: Box::new(m_sq_thermal),
        }
    }

    pub fn m_sq_vacuum(&self, fields: &[f64]) -> f64 {
        (self.m_sq_vacuum)(fields)
    }

    pub fn dm_sq_vacuum(&self, fields: &[f64]) -> Vec<f64> {
        (self.dm_sq_vacuum)(fields)
    }

    pub fn m_sq_thermal(&self, temperature: f64) -> f64 {
        (self.m_sq_thermal)(temperature)
    }

    pub fn m_sq_total(&self, fields: &[f64], temperature: f64) -> f64 {
        self.m_sq_vacuum(fields) + self.m_sq_thermal(temperature)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fermi_dirac_equilibrium_is_bounded() {
        let stats = Statistics::FermiDirac;
        assert!(stats.equilibrium(0.0) - 0.5 < 1e-12);
        assert!(stats.equilibrium(10.0) < 1e-3);
    }

    #[test]
    fn particle_reports_vacuum_and_thermal_mass() {
        let particle = Particle::new(
            "top",
            Statistics::FermiDirac,
            false,
            false,
            12.0,
            |fields: &[f64]| 0.5 * fields[0] * fields[0],
            |fields: &[f64]| vec![fields[0]],
            |t: f64| 0.1 * t * t,
        );
        assert!((particle.m_sq_vacuum(&[2.0]) - 2.0).abs() < 1e-12);
        assert!((particle.m_sq_thermal(3.0) - 0.9).abs() < 1e-12);
        assert_eq!(particle.dm_sq_vacuum(&[2.0]), vec![2.0]);
    }
}
