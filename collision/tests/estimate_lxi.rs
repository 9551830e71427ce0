use ndarray::Array4;
use wallspeed_collision::CollisionArray;
use wallspeed_grid::{AxisTag, Basis, Direction, Grid, Polynomial};

fn tags() -> Vec<AxisTag> {
    vec![
        AxisTag::new(Basis::Cardinal, Direction::Pz, false),
        AxisTag::new(Basis::Cardinal, Direction::PPerp, false),
        AxisTag::new(Basis::Cardinal, Direction::Z, false),
        AxisTag::new(Basis::Cardinal, Direction::Z, false),
    ]
}

/// Builds a collision tensor whose `C / P` matrix is exactly `diag(-10)`
/// for any `(v_wall, mass_sq)`, so `estimate_lxi`'s eigenvalue estimate is
/// pinned down analytically: `1 / (10 * T^2)`.
fn diagonal_tensor(grid: &Grid, n: usize, v_wall: f64, mass_sq: f64) -> Array4<f64> {
    let gamma = 1.0 / (1.0 - v_wall * v_wall).sqrt();
    let pz: Vec<f64> = grid.rho_z_interior().iter().map(|&rho| grid.pz_of_rho(rho)).collect();
    let pp: Vec<f64> = grid.rho_perp_interior().iter().map(|&rho| grid.pperp_of_rho(rho)).collect();

    Array4::from_shape_fn((n, n, n, n), |(a, b, p1, p2)| {
        if (a, b) == (p1, p2) {
            let energy = (pz[a].powi(2) + pp[b].powi(2) + mass_sq).sqrt();
            let p_wall = gamma * (pz[a] - v_wall * energy);
            -10.0 * p_wall
        } else {
            0.0
        }
    })
}

#[test]
fn test_estimate_lxi_scales_with_inverse_temperature_squared() {
    let n = 4;
    let v_wall = 0.4;
    let mass_sq = 1.0;
    let grid = Grid::new_symmetric(10, (n + 1) as usize, 5.0, 1.0).unwrap();

    let data = diagonal_tensor(&grid, n, v_wall, mass_sq).into_dyn();
    let polynomial = Polynomial::new(data, tags()).unwrap();
    let array = CollisionArray::from_polynomial(polynomial, ("top".into(), "top".into())).unwrap();

    let lxi_low = array.estimate_lxi(&grid, v_wall, 50.0, mass_sq).unwrap();
    let lxi_high = array.estimate_lxi(&grid, v_wall, 200.0, mass_sq).unwrap();

    assert!((lxi_low - 1.0 / (10.0 * 50.0_f64.powi(2))).abs() < 1e-9);
    assert!((lxi_high - 1.0 / (10.0 * 200.0_f64.powi(2))).abs() < 1e-9);
    assert!((lxi_low / lxi_high - 16.0).abs() < 1e-6);
}
