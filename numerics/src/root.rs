//! Scalar root-finding: bisection, secant, and Brent's method combining
//! both with inverse quadratic interpolation.

use crate::error::{NumericsError, Result};

/// Finds a sign change of `f` by doubling `hi` outward from `(lo, hi)`, up
/// to `max_doublings` times. Returns the bracket once `f(lo)` and `f(hi)`
/// have opposite signs.
pub fn expand_bracket<F>(mut f: F, lo: f64, mut hi: f64, max_doublings: usize) -> Result<(f64, f64)>
where
    F: FnMut(f64) -> f64,
{
    let f_lo = f(lo);
    let mut f_hi = f(hi);
    let mut doublings = 0;
    while f_lo.signum() == f_hi.signum() && doublings < max_doublings {
        hi += hi - lo;
        f_hi = f(hi);
        doublings += 1;
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(NumericsError::NoBracket { lo, hi, f_lo, f_hi });
    }
    Ok((lo, hi))
}

/// Plain bisection, `max_iter` halvings or until `|f(mid)| < tol`.
pub fn bisect<F>(mut f: F, mut lo: f64, mut hi: f64, tol: f64, max_iter: usize) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo.signum() == f_hi.signum() {
        return Err(NumericsError::NoBracket {
            lo,
            hi,
            f_lo,
            f_hi,
        });
    }
    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid.abs() < tol {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(NumericsError::RootNotConverged {
        max_iter,
        residual: f((lo + hi) / 2.0),
    })
}

/// Secant method starting from `(x0, x1)`, `max_iter` steps or `|dx| < tol`.
pub fn secant<F>(mut f: F, x0: f64, x1: f64, tol: f64, max_iter: usize) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut xa = x0;
    let mut xb = x1;
    let mut fa = f(xa);
    for _ in 0..max_iter {
        let fb = f(xb);
        if fb.abs() < tol {
            return Ok(xb);
        }
        let denom = fb - fa;
        if denom.abs() < f64::EPSILON {
            break;
        }
        let xc = xb - fb * (xb - xa) / denom;
        xa = xb;
        fa = fb;
        xb = xc;
    }
    Err(NumericsError::RootNotConverged {
        max_iter,
        residual: f(xb),
    })
}

/// Brent's method: combines bisection, secant and inverse quadratic
/// interpolation, guaranteed to converge given a valid bracket
/// (Numerical Recipes §9.3 / Brent 1973).
pub fn brent<F>(mut f: F, a: f64, b: f64, tol: f64, max_iter: usize) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);
    if fa.signum() == fb.signum() {
        return Err(NumericsError::NoBracket {
            lo: a,
            hi: b,
            f_lo: fa,
            f_hi: fb,
        });
    }
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = a;
    let mut fc = fa;
    let mut mflag = true;
    let mut d = a;

    for _ in 0..max_iter {
        if fb.abs() < tol {
            return Ok(b);
        }
        if (b - a).abs() < tol {
            return Ok(b);
        }

        let s = if (fa - fc).abs() > f64::EPSILON && (fb - fc).abs() > f64::EPSILON {
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            b - fb * (b - a) / (fb - fa)
        };

        let cond_interp_bad = !((3.0 * a + b) / 4.0..=b).contains(&s)
            && !((b..=(3.0 * a + b) / 4.0).contains(&s));
        let bisection_mid = 0.5 * (b + c);

        let use_bisection = s.is_nan()
            || cond_interp_bad
            || (mflag && (s - b).abs() >= (b - c).abs() / 2.0)
            || (!mflag && (s - b).abs() >= (c - d).abs() / 2.0)
            || (mflag && (b - c).abs() < tol)
            || (!mflag && (c - d).abs() < tol);

        let s = if use_bisection { bisection_mid } else { s };
        mflag = use_bisection;

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;

        if fa.signum() != fs.signum() {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
        let _ = d;
    }
    Err(NumericsError::RootNotConverged {
        max_iter,
        residual: fb,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bisect_finds_sqrt_two() {
        let root = bisect(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 200).unwrap();
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn brent_finds_root_of_cubic() {
        let f = |x: f64| x.powi(3) - x - 2.0;
        let root = brent(f, 1.0, 2.0, 1e-12, 100).unwrap();
        assert!((f(root)).abs() < 1e-8);
    }

    #[test]
    fn expand_bracket_finds_sign_change_outward() {
        let f = |x: f64| x - 5.0;
        let (lo, hi) = expand_bracket(f, 0.0, 1.0, 10).unwrap();
        assert!(f(lo).signum() != f(hi).signum());
    }

    #[test]
    fn secant_converges_on_smooth_function() {
        let root = secant(|x| x.cos() - x, 0.0, 1.0, 1e-10, 100).unwrap();
        assert!((root.cos() - root).abs() < 1e-8);
    }
}
