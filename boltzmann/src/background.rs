//! The frozen wall/plasma background a single Boltzmann solve is assembled
//! against: the grid, the wall velocity, and the field/temperature profiles
//! sampled at the grid's interior spatial nodes.

use std::sync::Arc;

use ndarray::Array2;
use wallspeed_grid::Grid;

/// Field and temperature profiles sampled at the interior `chi` nodes of
/// `grid`, plus the wall velocity that sets `P = gamma_w (p_z - v_w E)`.
pub struct BoltzmannBackground {
    grid: Arc<Grid>,
    velocity_wall: f64,
    /// `(field_count, m - 1)`: one row per background field.
    field_profile: Array2<f64>,
    /// `(m - 1,)` temperature at each interior spatial node.
    temperature_profile: Vec<f64>,
}

impl BoltzmannBackground {
    pub fn new(
        grid: Arc<Grid>,
        velocity_wall: f64,
        field_profile: Array2<f64>,
        temperature_profile: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(field_profile.ncols(), temperature_profile.len());
        Self {
            grid,
            velocity_wall,
            field_profile,
            temperature_profile,
        }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn velocity_wall(&self) -> f64 {
        self.velocity_wall
    }

    pub fn gamma_wall(&self) -> f64 {
        1.0 / (1.0 - self.velocity_wall * self.velocity_wall).sqrt()
    }

    pub fn field_count(&self) -> usize {
        self.field_profile.nrows()
    }

    pub fn spatial_points(&self) -> usize {
        self.temperature_profile.len()
    }

    pub fn fields_at(&self, chi_index: usize) -> Vec<f64> {
        self.field_profile.column(chi_index).to_vec()
    }

    pub fn temperature_at(&self, chi_index: usize) -> f64 {
        self.temperature_profile[chi_index]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wallspeed_grid::Grid;

    #[test]
    fn reports_field_count_and_spatial_points() {
        let grid = Arc::new(Grid::new_symmetric(8, 5, 5.0, 1.0).unwrap());
        let m = grid.m() - 1;
        let fields = Array2::zeros((2, m));
        let temps = vec![100.0; m];
        let background = BoltzmannBackground::new(grid, 0.4, fields, temps);
        assert_eq!(background.field_count(), 2);
        assert_eq!(background.spatial_points(), m);
    }
}
