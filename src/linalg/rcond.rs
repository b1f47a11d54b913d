#![allow(non_snake_case)]

//! Reciprocal condition numbers of covariance matrices.
//!
//! Used to validate a covariance before it is installed into a filter.

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField};

/// Relative asymmetry tolerated in an installed covariance.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Estimate the reciprocal condition number of a symmetric matrix for inversion.
///
/// Only the diagonal is considered: the max diagonal element is taken as the norm of the matrix
/// and the min as the norm of its inverse, so rcond = min/max.
///
/// Defined to be 0 for an empty or semi-definite matrix, and when min and max are both infinite.
/// Defined to be < 0 if any diagonal element is negative or NaN.
pub fn rcond_symetric<N: RealField, D: Dim>(sm: &MatrixN<N, D>) -> N
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let n = sm.nrows();
    if n == 0 {
        return N::zero();
    }
    let mut mind = sm[(0, 0)];
    let mut maxd = mind;
    for i in 0..n {
        let d = sm[(i, i)];
        // NaN
        if d != d {
            return -N::one();
        }
        if d < mind {
            mind = d;
        }
        if d > maxd {
            maxd = d;
        }
    }

    if mind < N::zero() {
        // Does not represent a rcond
        return mind;
    }
    let rcond = mind / maxd;
    // 0/0 or inf/inf
    if rcond != rcond {
        N::zero()
    } else {
        rcond
    }
}

/// Checks a reciprocal condition number is > 0. NaN is never positive.
pub fn check_positive<N: RealField>(rcond: N, message: &'static str) -> Result<N, &'static str> {
    if rcond > N::zero() {
        Ok(rcond)
    } else {
        Err(message)
    }
}

/// Checks a covariance is symmetric, within rounding, and has a positive diagonal.
///
/// Returns its reciprocal condition number. Definiteness is not checked, a Cholesky
/// factorisation of the matrix will fail later if it is indefinite.
pub fn check_covariance<N: RealField, D: Dim>(X: &MatrixN<N, D>) -> Result<N, &'static str>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let rcond = check_positive(rcond_symetric(X), "X not PD")?;
    let tolerance: N = na::convert(SYMMETRY_TOLERANCE);
    let n = X.nrows();
    for i in 0..n {
        for j in 0..i {
            let (a, b) = (X[(i, j)], X[(j, i)]);
            let scale = a.abs().max(b.abs()).max(N::one());
            if !((a - b).abs() <= tolerance * scale) {
                return Err("X not symmetric");
            }
        }
    }
    Ok(rcond)
}
