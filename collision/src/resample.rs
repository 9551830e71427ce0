//! Resamples one axis of a tensor from its native Chebyshev-Lobatto grid
//! onto a different-sized target grid, used when a collision file's basis
//! size does not match the target grid's.

use ndarray::{Array2, ArrayD, Axis, IxDyn};
use wallspeed_grid::cheb;

/// Builds the `(new_n + 1) x (old_n + 1)` interpolation matrix mapping
/// nodal values at the old Chebyshev-Lobatto nodes to values at the new
/// ones, via the Lagrange cardinal basis.
fn interpolation_matrix(old_n: usize, new_n: usize) -> Array2<f64> {
    let new_nodes = cheb::lobatto_nodes(new_n);
    let mut matrix = Array2::<f64>::zeros((new_n + 1, old_n + 1));
    for (row, &x) in new_nodes.iter().enumerate() {
        let basis = cheb::cardinal_basis_values(x, old_n);
        for (col, value) in basis.into_iter().enumerate() {
            matrix[[row, col]] = value;
        }
    }
    matrix
}

/// Resamples `axis` of `data` (currently of length `old_n + 1`) onto a
/// grid of `new_n + 1` Chebyshev-Lobatto nodes.
pub fn resample_axis(data: &ArrayD<f64>, axis: usize, old_n: usize, new_n: usize) -> ArrayD<f64> {
    let matrix = interpolation_matrix(old_n, new_n);

    let mut new_shape: Vec<usize> = data.shape().to_vec();
    new_shape[axis] = new_n + 1;
    let mut out = ArrayD::<f64>::zeros(IxDyn(&new_shape));

    let lanes_in = data.lanes(Axis(axis));
    let lanes_out = out.lanes_mut(Axis(axis));
    for (lane_in, mut lane_out) in lanes_in.into_iter().zip(lanes_out.into_iter()) {
        let v = lane_in.to_owned();
        let resampled = matrix.dot(&v);
        lane_out.assign(&resampled);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn resample_reproduces_polynomial_exactly() {
        let old_n = 8;
        let new_n = 4;
        let old_nodes = cheb::lobatto_nodes(old_n);
        let values: Array1<f64> = old_nodes.mapv(|x| x * x - 0.5 * x);
        let resampled = resample_axis(&values.into_dyn(), 0, old_n, new_n);

        let new_nodes = cheb::lobatto_nodes(new_n);
        for (i, &x) in new_nodes.iter().enumerate() {
            let expected = x * x - 0.5 * x;
            assert!((resampled[[i]] - expected).abs() < 1e-9);
        }
    }
}
