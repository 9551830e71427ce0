use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use wallspeed_boltzmann::{operator, BoltzmannBackground, Particle, Statistics};
use wallspeed_grid::Grid;

fn toy_background() -> BoltzmannBackground {
    let grid = Arc::new(Grid::new_symmetric(16, 11, 5.0, 1.0).unwrap());
    let m = grid.m() - 1;
    let fields = ndarray::Array2::zeros((1, m));
    let temps = vec![100.0; m];
    BoltzmannBackground::new(grid, 0.4, fields, temps)
}

fn top_quark() -> Particle {
    Particle::new(
        "top",
        Statistics::FermiDirac,
        false,
        false,
        12.0,
        |fields: &[f64]| fields[0] * fields[0],
        |fields: &[f64]| vec![2.0 * fields[0]],
        |_t: f64| 0.0,
    )
}

fn assemble_operator(c: &mut Criterion) {
    let background = toy_background();
    let particle = top_quark();

    c.bench_function("operator::assemble (16x11x11 grid, no collisions)", |b| {
        b.iter(|| operator::assemble(&background, &particle, None))
    });
}

criterion_group!(benches, assemble_operator);
criterion_main!(benches);
