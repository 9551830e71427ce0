//! Chebyshev-Lobatto node generation, differentiation matrices, basis-change
//! matrices and Clenshaw-Curtis quadrature weights.
//!
//! All functions here build the small, dense `(n+1) x (n+1)` matrices that
//! [`crate::polynomial::Polynomial`] applies along a tagged axis. Kept
//! separate from the tensor machinery so each piece of the spectral
//! bookkeeping can be tested in isolation.

use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Chebyshev-Lobatto nodes `x_i = cos(i pi / n)` for `i = 0..=n`, descending
/// from `1` to `-1`. `n + 1` points, `n` interior segments.
pub fn lobatto_nodes(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n + 1, |i| (PI * i as f64 / n as f64).cos())
}

/// Interior-only nodes: the above with the two endpoints dropped.
pub fn lobatto_nodes_interior(n: usize) -> Array1<f64> {
    let full = lobatto_nodes(n);
    full.slice(ndarray::s![1..n]).to_owned()
}

/// Spectral differentiation matrix at the `n + 1` Chebyshev-Lobatto nodes
/// (Trefethen, *Spectral Methods in MATLAB*, `cheb.m`). Applying this matrix
/// to a vector of function values at the nodes returns the values of the
/// derivative at the same nodes.
pub fn differentiation_matrix(n: usize) -> Array2<f64> {
    if n == 0 {
        return Array2::zeros((1, 1));
    }
    let x = lobatto_nodes(n);
    let c = |i: usize| -> f64 {
        let boundary = if i == 0 || i == n { 2.0 } else { 1.0 };
        boundary * if i % 2 == 0 { 1.0 } else { -1.0 }
    };

    let mut d = Array2::<f64>::zeros((n + 1, n + 1));
    for i in 0..=n {
        for j in 0..=n {
            if i == j {
                continue;
            }
            d[[i, j]] = (c(i) / c(j)) / (x[i] - x[j]);
        }
    }
    for i in 0..=n {
        let row_sum: f64 = (0..=n).filter(|&j| j != i).map(|j| d[[i, j]]).sum();
        d[[i, i]] = -row_sum;
    }
    d
}

/// Clenshaw-Curtis quadrature weights at the `n + 1` Chebyshev-Lobatto nodes,
/// exact for polynomials of degree `<= n - 1` (Trefethen, `clencurt.m`).
pub fn clenshaw_curtis_weights(n: usize) -> Array1<f64> {
    if n == 0 {
        return Array1::from_elem(1, 2.0);
    }
    let nf = n as f64;
    let theta: Array1<f64> = Array1::from_shape_fn(n + 1, |i| PI * i as f64 / nf);
    let mut w = Array1::<f64>::zeros(n + 1);

    if n % 2 == 0 {
        w[0] = 1.0 / (nf * nf - 1.0);
        w[n] = w[0];
        for i in 1..n {
            let mut v = 1.0;
            for k in 1..(n / 2) {
                v -= 2.0 * (2.0 * k as f64 * theta[i]).cos() / (4.0 * (k as f64).powi(2) - 1.0);
            }
            v -= (nf * theta[i]).cos() / (nf * nf - 1.0);
            w[i] = 2.0 * v / nf;
        }
    } else {
        w[0] = 1.0 / (nf * nf);
        w[n] = w[0];
        for i in 1..n {
            let mut v = 1.0;
            for k in 1..=((n - 1) / 2) {
                v -= 2.0 * (2.0 * k as f64 * theta[i]).cos() / (4.0 * (k as f64).powi(2) - 1.0);
            }
            w[i] = 2.0 * v / nf;
        }
    }
    w
}

/// Maps the `n - 1` interior values of a function that vanishes at both
/// endpoints (homogeneous Dirichlet) to the derivative's full `n + 1`
/// values, by dropping the two boundary columns of the full differentiation
/// matrix (those columns would otherwise multiply the implicit zero
/// boundary values).
pub fn interior_to_full_differentiation_matrix(n: usize) -> Array2<f64> {
    let full = differentiation_matrix(n);
    let interior = n - 1;
    Array2::from_shape_fn((n + 1, interior), |(row, col)| full[[row, col + 1]])
}

/// Maps the full `n + 1` values of a function to the derivative's `n - 1`
/// interior values, by dropping the two boundary rows of the full
/// differentiation matrix (the derivative's own boundary values are not
/// part of the interior-only representation).
pub fn full_to_interior_differentiation_matrix(n: usize) -> Array2<f64> {
    let full = differentiation_matrix(n);
    let interior = n - 1;
    Array2::from_shape_fn((interior, n + 1), |(row, col)| full[[row + 1, col]])
}

/// Interior-to-interior differentiation matrix under the implicit
/// zero-boundary convention: the two boundary rows and columns of the full
/// differentiation matrix are both dropped. Equivalent to applying
/// [`interior_to_full_differentiation_matrix`] and then
/// [`full_to_interior_differentiation_matrix`], but built directly.
pub fn interior_differentiation_matrix(n: usize) -> Array2<f64> {
    let full = differentiation_matrix(n);
    let interior = n - 1;
    Array2::from_shape_fn((interior, interior), |(a, b)| full[[a + 1, b + 1]])
}

/// `V[i, k] = T_k(x_i)`: maps Chebyshev coefficients to values at the nodes.
pub fn chebyshev_to_cardinal_matrix(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n + 1, n + 1), |(i, k)| (PI * (i * k) as f64 / n as f64).cos())
}

/// Closed-form inverse of [`chebyshev_to_cardinal_matrix`] (a scaled
/// discrete cosine transform), mapping nodal values to Chebyshev
/// coefficients without a generic matrix inversion.
pub fn cardinal_to_chebyshev_matrix(n: usize) -> Array2<f64> {
    if n == 0 {
        return Array2::from_elem((1, 1), 1.0);
    }
    let nf = n as f64;
    let boundary_factor = |i: usize| -> f64 {
        if i == 0 || i == n {
            2.0
        } else {
            1.0
        }
    };
    Array2::from_shape_fn((n + 1, n + 1), |(k, i)| {
        let ck = boundary_factor(k);
        let ci = boundary_factor(i);
        (2.0 / (nf * ck * ci)) * (PI * (i * k) as f64 / nf).cos()
    })
}

/// Chebyshev-series differentiation recurrence (Numerical Recipes §5.9):
/// given coefficients `a[0..=n]` of `f(x) = sum a_k T_k(x)`, returns the
/// `n` coefficients of `f'(x)`.
pub fn chebyshev_derivative_coefficients(a: &[f64]) -> Vec<f64> {
    let n = a.len() - 1;
    if n == 0 {
        return vec![0.0];
    }
    let mut deriv = vec![0.0; n];
    if n >= 1 {
        deriv[n - 1] = 2.0 * n as f64 * a[n];
    }
    for k in (1..n.saturating_sub(1)).rev() {
        deriv[k - 1] = deriv.get(k + 1).copied().unwrap_or(0.0) + 2.0 * k as f64 * a[k];
    }
    // deriv currently holds a'_1..a'_{n-1} fully resolved above down to a'_1;
    // a'_0 uses the half-weight of T_0.
    let a_prime_2 = deriv.get(2).copied().unwrap_or(0.0);
    deriv[0] = a_prime_2 / 2.0 + a.get(1).copied().unwrap_or(0.0);
    deriv
}

/// Values of the `n+1` Chebyshev polynomials `T_0(x)..T_n(x)` at `x`.
pub fn chebyshev_basis_values(x: f64, n: usize) -> Vec<f64> {
    let mut t = vec![0.0; n + 1];
    t[0] = 1.0;
    if n >= 1 {
        t[1] = x;
    }
    for k in 2..=n {
        t[k] = 2.0 * x * t[k - 1] - t[k - 2];
    }
    t
}

/// Lagrange cardinal polynomial values `l_i(x)` at an arbitrary point `x`,
/// for the `n + 1` Chebyshev-Lobatto nodes (barycentric form, Trefethen
/// weights `w_i = (-1)^i / c_i`).
pub fn cardinal_basis_values(x: f64, n: usize) -> Vec<f64> {
    let nodes = lobatto_nodes(n);
    let weight = |i: usize| -> f64 {
        let boundary = if i == 0 || i == n { 0.5 } else { 1.0 };
        boundary * if i % 2 == 0 { 1.0 } else { -1.0 }
    };

    if let Some(i) = nodes.iter().position(|&xi| (xi - x).abs() < 1e-14) {
        let mut l = vec![0.0; n + 1];
        l[i] = 1.0;
        return l;
    }

    let terms: Vec<f64> = (0..=n).map(|i| weight(i) / (x - nodes[i])).collect();
    let denom: f64 = terms.iter().sum();
    terms.iter().map(|t| t / denom).collect()
}
