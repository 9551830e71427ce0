//! The tanh wall ansatz: `phi_i(z)` interpolates each field between its
//! broken-phase (`bot`) and symmetric-phase (`top`) value over a width
//! `L_i` centered at an offset `delta_i`, with `delta_1 = 0` fixing the
//! overall translation freedom.

/// Widths and offsets of the tanh ansatz, one pair per background field.
/// `offsets[0]` is always `0.0`; it is carried in the vector for uniform
/// indexing but never varied by the fit.
#[derive(Debug, Clone)]
pub struct WallParams {
    pub widths: Vec<f64>,
    pub offsets: Vec<f64>,
}

impl WallParams {
    pub fn new(field_count: usize, initial_width: f64) -> Self {
        Self {
            widths: vec![initial_width; field_count],
            offsets: vec![0.0; field_count],
        }
    }

    /// Packs the free parameters `(L_1..L_F, delta_2..delta_F)` into a flat
    /// vector for the Levenberg-Marquardt fit.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut packed = self.widths.clone();
        packed.extend_from_slice(&self.offsets[1..]);
        packed
    }

    /// Inverse of [`WallParams::to_vec`].
    pub fn from_vec(field_count: usize, params: &[f64]) -> Self {
        let widths = params[..field_count].to_vec();
        let mut offsets = vec![0.0];
        offsets.extend_from_slice(&params[field_count..]);
        Self { widths, offsets }
    }

    pub fn field_count(&self) -> usize {
        self.widths.len()
    }

    /// `phi_i(z)` for every field at one spatial point `z`.
    pub fn fields_at(&self, z: f64, phi_bot: &[f64], phi_top: &[f64]) -> Vec<f64> {
        (0..self.field_count())
            .map(|i| {
                let t = ((z - self.offsets[i]) / self.widths[i]).tanh();
                0.5 * phi_bot[i] * (1.0 + t) + 0.5 * phi_top[i] * (1.0 - t)
            })
            .collect()
    }

    /// `d(phi_i)/dz` for every field at one spatial point `z`.
    pub fn derivative_at(&self, z: f64, phi_bot: &[f64], phi_top: &[f64]) -> Vec<f64> {
        (0..self.field_count())
            .map(|i| {
                let arg = (z - self.offsets[i]) / self.widths[i];
                let sech_sq = 1.0 - arg.tanh().powi(2);
                0.5 * (phi_bot[i] - phi_top[i]) * sech_sq / self.widths[i]
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_flat_vector() {
        let params = WallParams {
            widths: vec![1.0, 2.0, 3.0],
            offsets: vec![0.0, -0.5, 0.7],
        };
        let packed = params.to_vec();
        let restored = WallParams::from_vec(3, &packed);
        assert_eq!(restored.widths, params.widths);
        assert_eq!(restored.offsets, params.offsets);
    }

    #[test]
    fn interpolates_between_bot_and_top_far_from_wall() {
        let params = WallParams::new(1, 1.0);
        let bot = [1.0];
        let top = [0.0];
        assert!((params.fields_at(-50.0, &bot, &top)[0] - 1.0).abs() < 1e-6);
        assert!((params.fields_at(50.0, &bot, &top)[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn derivative_vanishes_far_from_wall() {
        let params = WallParams::new(1, 1.0);
        let bot = [1.0];
        let top = [0.0];
        assert!(params.derivative_at(50.0, &bot, &top)[0].abs() < 1e-6);
    }
}
