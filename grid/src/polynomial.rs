//! Rank-N tensor of values (or coefficients) tagged per axis with a basis,
//! a physical direction and whether the two endpoints are included.
//!
//! This is the one workhorse type the rest of the solver builds on:
//! [`crate::InterpolatableFunction`], the collision tensor and the
//! Boltzmann operator are all thin wrappers or direct consumers of
//! `Polynomial`.

use ndarray::{Array1, Array2, ArrayD, Axis, IxDyn};

use crate::cheb;
use crate::error::{GridError, Result};

/// Which of the two dual bases an axis's numbers are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Nodal values at the Chebyshev-Lobatto points.
    Cardinal,
    /// Coefficients of the Chebyshev polynomial expansion.
    Chebyshev,
}

/// Which physical coordinate an axis represents, purely for bookkeeping and
/// error messages; carries no numeric behavior of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Z,
    Pz,
    PPerp,
}

/// Per-axis metadata: basis, physical direction, and whether the endpoints
/// `chi = +-1` are included in this axis's nodes.
#[derive(Debug, Clone, Copy)]
pub struct AxisTag {
    pub basis: Basis,
    pub direction: Direction,
    pub endpoints: bool,
}

impl AxisTag {
    pub fn new(basis: Basis, direction: Direction, endpoints: bool) -> Self {
        Self {
            basis,
            direction,
            endpoints,
        }
    }
}

/// A rank-N tensor of values or coefficients, one [`AxisTag`] per axis.
#[derive(Debug, Clone)]
pub struct Polynomial {
    data: ArrayD<f64>,
    axes: Vec<AxisTag>,
}

impl Polynomial {
    /// Builds a tagged tensor. Fails if `data.ndim() != axes.len()`.
    pub fn new(data: ArrayD<f64>, axes: Vec<AxisTag>) -> Result<Self> {
        if data.ndim() != axes.len() {
            return Err(GridError::ShapeMismatch {
                expected: vec![axes.len()],
                actual: vec![data.ndim()],
            });
        }
        Ok(Self { data, axes })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn axes(&self) -> &[AxisTag] {
        &self.axes
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Degree of the axis's basis: `n` such that the axis has `n + 1` nodes.
    fn degree(&self, axis: usize) -> usize {
        self.data.shape()[axis] - 1
    }

    /// Differentiates along `axis`, returning a new tensor. Chebyshev axes
    /// differentiate via the coefficient recurrence, same length, same
    /// endpoint tag. Cardinal axes differentiate via the spectral
    /// differentiation matrix; endpoint inclusion flips, per the invariant
    /// that differentiating an interior-only axis (implicitly zero at both
    /// ends) yields an endpoint-inclusive axis and vice versa: an
    /// endpoint-inclusive axis's derivative is only tracked at its `n - 1`
    /// interior nodes (the boundary derivative values aren't part of the
    /// interior-only representation), while an interior-only axis's
    /// derivative is recovered at all `n + 1` nodes (its boundary values
    /// need not vanish even though the function itself does).
    pub fn derivative(&self, axis: usize) -> Result<Self> {
        self.require_axis(axis)?;
        let tag = self.axes[axis];

        match tag.basis {
            Basis::Cardinal => self.derivative_cardinal(axis, tag),
            Basis::Chebyshev => {
                let differentiated = apply_chebyshev_derivative_along_axis(&self.data, axis);
                Ok(Self {
                    data: differentiated,
                    axes: self.axes.clone(),
                })
            }
        }
    }

    fn derivative_cardinal(&self, axis: usize, tag: AxisTag) -> Result<Self> {
        let mut axes = self.axes.clone();

        if tag.endpoints {
            let n = self.degree(axis);
            let matrix = cheb::full_to_interior_differentiation_matrix(n);
            let differentiated = apply_matrix_along_axis(&self.data, axis, &matrix);
            axes[axis].endpoints = false;
            Ok(Self {
                data: differentiated,
                axes,
            })
        } else {
            let interior_len = self.data.shape()[axis];
            let n = interior_len + 1;
            let matrix = cheb::interior_to_full_differentiation_matrix(n);
            let differentiated = apply_matrix_along_axis(&self.data, axis, &matrix);
            axes[axis].endpoints = true;
            Ok(Self {
                data: differentiated,
                axes,
            })
        }
    }

    /// Changes the basis of `axis` between [`Basis::Cardinal`] and
    /// [`Basis::Chebyshev`]. `inverse_transpose` applies the transpose of the
    /// change-of-basis matrix instead, needed when transforming a covariant
    /// quantity (e.g. a collision kernel acting on the dual space).
    pub fn change_basis(&self, axis: usize, to: Basis, inverse_transpose: bool) -> Result<Self> {
        self.require_axis(axis)?;
        let tag = self.axes[axis];
        if tag.basis == to {
            return Ok(self.clone());
        }
        let n = self.degree(axis);

        let mut matrix = match to {
            Basis::Cardinal => cheb::chebyshev_to_cardinal_matrix(n),
            Basis::Chebyshev => cheb::cardinal_to_chebyshev_matrix(n),
        };
        if inverse_transpose {
            matrix = matrix.t().to_owned();
        }

        let transformed = apply_matrix_along_axis(&self.data, axis, &matrix);
        let mut axes = self.axes.clone();
        axes[axis].basis = to;
        Ok(Self {
            data: transformed,
            axes,
        })
    }

    /// Clenshaw-Curtis integration over `axis`, weighted by the node
    /// measure. Requires the axis to be in the cardinal (nodal) basis.
    pub fn integrate_axis(&self, axis: usize) -> Result<Self> {
        self.require_axis(axis)?;
        let tag = self.axes[axis];
        if tag.basis != Basis::Cardinal {
            return Err(GridError::AxisMismatch(format!(
                "integrate_axis requires a cardinal-basis axis, found {:?}",
                tag.basis
            )));
        }
        let n = self.degree(axis);
        let weights = cheb::clenshaw_curtis_weights(n);

        let reduced_shape: Vec<usize> = self
            .data
            .shape()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != axis)
            .map(|(_, &s)| s)
            .collect();
        let mut out = ArrayD::<f64>::zeros(IxDyn(&reduced_shape));

        for (index, &value) in self.data.indexed_iter() {
            let idx = index.as_array_view();
            let w = weights[idx[axis]];
            let mut out_index = Vec::with_capacity(reduced_shape.len());
            for (i, &component) in idx.iter().enumerate() {
                if i != axis {
                    out_index.push(component);
                }
            }
            out[IxDyn(&out_index)] += value * w;
        }

        let mut axes = self.axes.clone();
        axes.remove(axis);
        Ok(Self { data: out, axes })
    }

    /// Full tensor contraction against interpolation vectors evaluated at
    /// one point per axis, in `coords` order. Returns the interpolated
    /// scalar value at that point.
    pub fn evaluate_at(&self, coords: &[f64]) -> Result<f64> {
        if coords.len() != self.rank() {
            return Err(GridError::AxisMismatch(format!(
                "evaluate_at expected {} coordinates, got {}",
                self.rank(),
                coords.len()
            )));
        }
        for &x in coords {
            if !(-1.0..=1.0).contains(&x) {
                return Err(GridError::OutsideDomain { x });
            }
        }

        let mut current = self.data.clone();
        // Contract axes from the last one down so earlier axis indices stay
        // valid as we shrink the tensor.
        for axis in (0..self.rank()).rev() {
            let n = current.shape()[axis] - 1;
            let tag = self.axes[axis];
            let basis_vector = match tag.basis {
                Basis::Cardinal => cheb::cardinal_basis_values(coords[axis], n),
                Basis::Chebyshev => cheb::chebyshev_basis_values(coords[axis], n),
            };
            current = contract_last_axis(&current, axis, &basis_vector);
        }
        Ok(*current.iter().next().unwrap_or(&0.0))
    }

    fn require_axis(&self, axis: usize) -> Result<()> {
        if axis >= self.rank() {
            return Err(GridError::AxisMismatch(format!(
                "axis {axis} out of range for rank-{} tensor",
                self.rank()
            )));
        }
        Ok(())
    }
}

/// Applies a (possibly rectangular) matrix along one axis of an
/// N-dimensional tensor: every 1D lane along `axis` is replaced by
/// `matrix.dot(lane)`. `matrix.ncols()` must equal the input axis length;
/// the output axis length becomes `matrix.nrows()`.
fn apply_matrix_along_axis(data: &ArrayD<f64>, axis: usize, matrix: &Array2<f64>) -> ArrayD<f64> {
    let mut out_shape: Vec<usize> = data.shape().to_vec();
    out_shape[axis] = matrix.nrows();
    let mut result = ArrayD::<f64>::zeros(IxDyn(&out_shape));

    let lanes_in = data.lanes(Axis(axis));
    let lanes_out = result.lanes_mut(Axis(axis));
    for (lane_in, mut lane_out) in lanes_in.into_iter().zip(lanes_out.into_iter()) {
        let v: Array1<f64> = lane_in.to_owned();
        let mv = matrix.dot(&v);
        lane_out.assign(&mv);
    }
    result
}

/// Applies the Chebyshev coefficient-space derivative recurrence along one
/// axis: each lane of coefficients is replaced by its derivative's
/// coefficients (one shorter, zero-padded back to the original length).
fn apply_chebyshev_derivative_along_axis(data: &ArrayD<f64>, axis: usize) -> ArrayD<f64> {
    let mut result = data.clone();
    let lanes_in = data.lanes(Axis(axis));
    let lanes_out = result.lanes_mut(Axis(axis));
    for (lane_in, mut lane_out) in lanes_in.into_iter().zip(lanes_out.into_iter()) {
        let a: Vec<f64> = lane_in.iter().copied().collect();
        let mut deriv = cheb::chebyshev_derivative_coefficients(&a);
        deriv.resize(a.len(), 0.0);
        for (slot, value) in lane_out.iter_mut().zip(deriv.iter()) {
            *slot = *value;
        }
    }
    result
}

/// Contracts `axis` of `data` against `vector`, collapsing that dimension.
fn contract_last_axis(data: &ArrayD<f64>, axis: usize, vector: &[f64]) -> ArrayD<f64> {
    let reduced_shape: Vec<usize> = data
        .shape()
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != axis)
        .map(|(_, &s)| s)
        .collect();
    let mut out = ArrayD::<f64>::zeros(IxDyn(&reduced_shape));

    for (index, &value) in data.indexed_iter() {
        let idx = index.as_array_view();
        let w = vector[idx[axis]];
        let mut out_index = Vec::with_capacity(reduced_shape.len());
        for (i, &component) in idx.iter().enumerate() {
            if i != axis {
                out_index.push(component);
            }
        }
        out[IxDyn(&out_index)] += value * w;
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn axis_tag(endpoints: bool) -> AxisTag {
        AxisTag::new(Basis::Cardinal, Direction::Z, endpoints)
    }

    #[test]
    fn evaluate_at_node_recovers_value() {
        let n = 6;
        let nodes = cheb::lobatto_nodes(n);
        let values = nodes.mapv(|x| x * x - 1.0);
        let poly = Polynomial::new(values.clone().into_dyn(), vec![axis_tag(true)]).unwrap();

        for (i, &x) in nodes.iter().enumerate() {
            let v = poly.evaluate_at(&[x]).unwrap();
            assert!((v - values[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn derivative_of_endpoint_inclusive_axis_yields_interior_only_axis() {
        let n = 8;
        let nodes = cheb::lobatto_nodes(n);
        let interior_nodes = cheb::lobatto_nodes_interior(n);
        let values = nodes.mapv(|x| x.powi(3) - 2.0 * x);
        let poly = Polynomial::new(values.into_dyn(), vec![axis_tag(true)]).unwrap();
        let deriv = poly.derivative(0).unwrap();

        assert!(!deriv.axes()[0].endpoints);
        assert_eq!(deriv.shape()[0], n - 1);
        for (i, &x) in interior_nodes.iter().enumerate() {
            let expected = 3.0 * x.powi(2) - 2.0;
            let got = deriv.data()[[i]];
            assert!((got - expected).abs() < 1e-8, "node {i}: {got} vs {expected}");
        }
    }

    #[test]
    fn derivative_of_interior_only_axis_yields_endpoint_inclusive_axis() {
        let n = 8;
        let nodes = cheb::lobatto_nodes(n);
        let interior_nodes = cheb::lobatto_nodes_interior(n);
        // Vanishes at both endpoints, but its derivative need not.
        let values = interior_nodes.mapv(|x| 1.0 - x * x);
        let tag = AxisTag::new(Basis::Cardinal, Direction::Z, false);
        let poly = Polynomial::new(values.into_dyn(), vec![tag]).unwrap();
        let deriv = poly.derivative(0).unwrap();

        assert!(deriv.axes()[0].endpoints);
        assert_eq!(deriv.shape()[0], n + 1);
        for (i, &x) in nodes.iter().enumerate() {
            let expected = -2.0 * x;
            let got = deriv.data()[[i]];
            assert!((got - expected).abs() < 1e-8, "node {i}: {got} vs {expected}");
        }
    }

    #[test]
    fn basis_change_round_trip_on_tensor() {
        let n = 5;
        let nodes = cheb::lobatto_nodes(n);
        let values = nodes.mapv(|x| x.powi(2) + x);
        let poly = Polynomial::new(values.clone().into_dyn(), vec![axis_tag(true)]).unwrap();

        let coeffs = poly.change_basis(0, Basis::Chebyshev, false).unwrap();
        let back = coeffs.change_basis(0, Basis::Cardinal, false).unwrap();

        for (a, b) in poly.data().iter().zip(back.data().iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn integrate_axis_reduces_rank_and_matches_clenshaw_curtis() {
        let n = 10;
        let nodes = cheb::lobatto_nodes(n);
        let values = nodes.mapv(|x| x.powi(2));
        let poly = Polynomial::new(values.into_dyn(), vec![axis_tag(true)]).unwrap();
        let integral = poly.integrate_axis(0).unwrap();
        // integral of x^2 over [-1, 1] is 2/3
        assert!((integral.data()[[]] - 2.0 / 3.0).abs() < 1e-8);
    }

    #[test]
    fn two_d_tensor_evaluate_matches_product_of_polynomials() {
        let n = 4;
        let nodes = cheb::lobatto_nodes(n);
        let mut data = ndarray::Array2::<f64>::zeros((n + 1, n + 1));
        for (i, &x) in nodes.iter().enumerate() {
            for (j, &y) in nodes.iter().enumerate() {
                data[[i, j]] = (x * x) * (y + 1.0);
            }
        }
        let poly = Polynomial::new(data.into_dyn(), vec![axis_tag(true), axis_tag(true)]).unwrap();
        let v = poly.evaluate_at(&[0.3, -0.4]).unwrap();
        let expected = (0.3f64 * 0.3) * (-0.4 + 1.0);
        assert!((v - expected).abs() < 1e-6);
    }
}
