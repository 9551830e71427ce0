//! Interpolates the fluid temperature across the wall.
//!
//! The hydrodynamic engine only fixes `T+` and `T-` at the wall's two
//! faces; the temperature profile inside the wall itself is not separately
//! solved for, so it is interpolated with the same tanh shape as the field
//! profile and the same `z -> +inf` / `z -> -inf` convention as
//! [`crate::wall_profile::WallParams::fields_at`] (`t_minus` plays the role
//! of `phi_bot`, `t_plus` the role of `phi_top`).

/// `T(z)` at every `z` in `xi`, using `width` as the profile's
/// characteristic thickness (the mean of the fitted field widths).
pub fn temperature_profile(xi: &[f64], t_plus: f64, t_minus: f64, width: f64) -> Vec<f64> {
    xi.iter()
        .map(|&z| {
            let tanh = (z / width).tanh();
            0.5 * t_minus * (1.0 + tanh) + 0.5 * t_plus * (1.0 - tanh)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interpolates_between_the_two_faces() {
        let xi = vec![-50.0, 0.0, 50.0];
        let profile = temperature_profile(&xi, 100.0, 120.0, 1.0);
        assert!((profile[0] - 120.0).abs() < 1e-6);
        assert!((profile[2] - 100.0).abs() < 1e-6);
        assert!(profile[1] > 100.0 && profile[1] < 120.0);
    }
}
