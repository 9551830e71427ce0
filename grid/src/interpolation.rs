//! Adaptive Chebyshev interpolation of an arbitrary (possibly vector-valued)
//! function on a finite interval, with configurable extrapolation outside
//! the fitted domain and a plain-text table format for caching to disk.

use std::io::{self, BufRead, Write};
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::cheb;
use crate::error::{GridError, Result};

/// What to do when asked to evaluate outside `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrapolationPolicy {
    /// Refuse: return [`GridError::OutsideDomain`].
    Error,
    /// Clamp to the boundary value.
    Constant,
    /// Linear extrapolation from the boundary value and slope.
    Linear,
}

/// A vector-valued function of one real variable, represented by its
/// Chebyshev interpolant on `[a, b]`. The fit is adaptive: the polynomial
/// degree doubles until the tail of the Chebyshev coefficients is
/// negligible relative to their peak magnitude, for every output
/// component.
#[derive(Debug, Clone)]
pub struct InterpolatableFunction {
    a: f64,
    b: f64,
    /// Nodal values at the Chebyshev-Lobatto points mapped into `[a, b]`,
    /// shape `(n + 1, k)` for `k` output components.
    values: Array2<f64>,
    extrap_low: ExtrapolationPolicy,
    extrap_high: ExtrapolationPolicy,
}

impl InterpolatableFunction {
    /// Fits `f` adaptively on `[a, b]`, doubling the degree from 8 up to
    /// `max_n` until the last three Chebyshev coefficients of every output
    /// component fall below `tol` times that component's peak coefficient.
    pub fn new_adaptive<F>(f: F, a: f64, b: f64, tol: f64, max_n: usize) -> Result<Self>
    where
        F: Fn(f64) -> Vec<f64>,
    {
        if !(b > a) {
            return Err(GridError::NonPositiveScale {
                name: "interval length (b - a)",
                value: b - a,
            });
        }

        let mut n = 8usize;
        loop {
            let nodes = cheb::lobatto_nodes(n);
            let physical: Array1<f64> = nodes.mapv(|x| map_to_physical(x, a, b));
            let first = f(physical[0]);
            let k = first.len();
            let mut values = Array2::<f64>::zeros((n + 1, k));
            for (row, &t) in physical.iter().enumerate() {
                let out = if row == 0 { first.clone() } else { f(t) };
                for (col, value) in out.into_iter().enumerate() {
                    values[[row, col]] = value;
                }
            }

            if n >= max_n || tail_is_converged(&values, n, tol) {
                return Ok(Self {
                    a,
                    b,
                    values,
                    extrap_low: ExtrapolationPolicy::Constant,
                    extrap_high: ExtrapolationPolicy::Constant,
                });
            }
            n *= 2;
        }
    }

    pub fn with_extrapolation(
        mut self,
        low: ExtrapolationPolicy,
        high: ExtrapolationPolicy,
    ) -> Self {
        self.extrap_low = low;
        self.extrap_high = high;
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn num_components(&self) -> usize {
        self.values.ncols()
    }

    pub fn degree(&self) -> usize {
        self.values.nrows() - 1
    }

    /// Evaluates every output component at `t`.
    pub fn evaluate(&self, t: f64) -> Result<Vec<f64>> {
        let x = map_to_compact(t, self.a, self.b);
        if x < -1.0 {
            return self.evaluate_outside(t, self.a, self.extrap_low);
        }
        if x > 1.0 {
            return self.evaluate_outside(t, self.b, self.extrap_high);
        }
        Ok(self.evaluate_compact(x))
    }

    fn evaluate_compact(&self, x: f64) -> Vec<f64> {
        let n = self.degree();
        let basis = cheb::cardinal_basis_values(x, n);
        (0..self.num_components())
            .map(|col| {
                basis
                    .iter()
                    .enumerate()
                    .map(|(row, &w)| w * self.values[[row, col]])
                    .sum()
            })
            .collect()
    }

    fn evaluate_outside(
        &self,
        t: f64,
        boundary: f64,
        policy: ExtrapolationPolicy,
    ) -> Result<Vec<f64>> {
        match policy {
            ExtrapolationPolicy::Error => {
                let x = map_to_compact(t, self.a, self.b);
                Err(GridError::OutsideDomain { x })
            }
            ExtrapolationPolicy::Constant => {
                let x = map_to_compact(boundary, self.a, self.b);
                Ok(self.evaluate_compact(x))
            }
            ExtrapolationPolicy::Linear => {
                let h = (self.b - self.a) * 1e-5;
                let t0 = boundary;
                let t1 = if boundary == self.a {
                    boundary + h
                } else {
                    boundary - h
                };
                let v0 = self.evaluate_compact(map_to_compact(t0, self.a, self.b));
                let v1 = self.evaluate_compact(map_to_compact(t1, self.a, self.b));
                let slope_sign = if t1 > t0 { 1.0 } else { -1.0 };
                Ok(v0
                    .iter()
                    .zip(v1.iter())
                    .map(|(&a, &b)| {
                        let slope = slope_sign * (b - a) / h;
                        a + slope * (t - t0)
                    })
                    .collect())
            }
        }
    }

    /// Writes the node table as whitespace-separated `t f1 .. fk` rows.
    pub fn write_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let nodes = cheb::lobatto_nodes(self.degree());
        for (row, &x) in nodes.iter().enumerate() {
            let t = map_to_physical(x, self.a, self.b);
            write!(writer, "{t:.17e}")?;
            for col in 0..self.num_components() {
                write!(writer, " {:.17e}", self.values[[row, col]])?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn write_text_file(&self, path: &Path) -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_text(io::BufWriter::new(file))
    }

    /// Reads back a table produced by [`InterpolatableFunction::write_text`].
    /// The rows are assumed to be at Chebyshev-Lobatto nodes in descending
    /// order, as written.
    pub fn read_text<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| GridError::AxisMismatch(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: std::result::Result<Vec<f64>, _> =
                line.split_whitespace().map(str::parse::<f64>).collect();
            let parsed =
                parsed.map_err(|e| GridError::AxisMismatch(format!("malformed table row: {e}")))?;
            rows.push(parsed);
        }
        if rows.len() < 2 {
            return Err(GridError::AxisMismatch(
                "interpolation table needs at least two rows".into(),
            ));
        }
        let k = rows[0].len() - 1;
        let a = *rows.last().unwrap().first().unwrap();
        let b = rows[0][0];
        let mut values = Array2::<f64>::zeros((rows.len(), k));
        for (row_idx, row) in rows.iter().enumerate() {
            for col in 0..k {
                values[[row_idx, col]] = row[col + 1];
            }
        }
        Ok(Self {
            a,
            b,
            values,
            extrap_low: ExtrapolationPolicy::Constant,
            extrap_high: ExtrapolationPolicy::Constant,
        })
    }

    pub fn read_text_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| GridError::AxisMismatch(format!("opening {}: {e}", path.display())))?;
        Self::read_text(io::BufReader::new(file))
    }
}

fn map_to_physical(x: f64, a: f64, b: f64) -> f64 {
    0.5 * (b - a) * x + 0.5 * (a + b)
}

fn map_to_compact(t: f64, a: f64, b: f64) -> f64 {
    (2.0 * t - (a + b)) / (b - a)
}

/// True once the last three Chebyshev coefficients of every component are
/// small relative to that component's peak coefficient magnitude.
fn tail_is_converged(values: &Array2<f64>, n: usize, tol: f64) -> bool {
    let v2c = cheb::cardinal_to_chebyshev_matrix(n);
    for col in 0..values.ncols() {
        let nodal = values.column(col).to_owned();
        let coeffs = v2c.dot(&nodal);
        let peak = coeffs.iter().fold(0.0_f64, |acc, &c| acc.max(c.abs()));
        if peak == 0.0 {
            continue;
        }
        let tail = coeffs
            .iter()
            .rev()
            .take(3)
            .fold(0.0_f64, |acc, &c| acc.max(c.abs()));
        if tail / peak >= tol {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adaptive_fit_recovers_smooth_function() {
        let f = |t: f64| vec![(t * t).sin(), t.cos()];
        let interp = InterpolatableFunction::new_adaptive(f, -2.0, 3.0, 1e-10, 128).unwrap();

        for &t in &[-2.0, -1.0, 0.0, 0.5, 1.7, 3.0] {
            let got = interp.evaluate(t).unwrap();
            let expected = f(t);
            assert!((got[0] - expected[0]).abs() < 1e-6, "t={t}");
            assert!((got[1] - expected[1]).abs() < 1e-6, "t={t}");
        }
    }

    #[test]
    fn constant_extrapolation_clamps_to_boundary() {
        let f = |t: f64| vec![t];
        let interp = InterpolatableFunction::new_adaptive(f, 0.0, 1.0, 1e-12, 32)
            .unwrap()
            .with_extrapolation(ExtrapolationPolicy::Constant, ExtrapolationPolicy::Constant);
        let low = interp.evaluate(-5.0).unwrap();
        let high = interp.evaluate(5.0).unwrap();
        assert!((low[0] - 0.0).abs() < 1e-6);
        assert!((high[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn error_extrapolation_rejects_outside_points() {
        let f = |t: f64| vec![t];
        let interp = InterpolatableFunction::new_adaptive(f, 0.0, 1.0, 1e-12, 32)
            .unwrap()
            .with_extrapolation(ExtrapolationPolicy::Error, ExtrapolationPolicy::Error);
        assert!(interp.evaluate(2.0).is_err());
    }

    #[test]
    fn text_round_trip_preserves_values() {
        let f = |t: f64| vec![t * t];
        let interp = InterpolatableFunction::new_adaptive(f, -1.0, 1.0, 1e-10, 64).unwrap();
        let mut buf = Vec::new();
        interp.write_text(&mut buf).unwrap();
        let parsed = InterpolatableFunction::read_text(io::BufReader::new(&buf[..])).unwrap();
        for &t in &[-0.9, 0.0, 0.4, 0.9] {
            let a = interp.evaluate(t).unwrap();
            let b = parsed.evaluate(t).unwrap();
            assert!((a[0] - b[0]).abs() < 1e-6);
        }
    }
}
