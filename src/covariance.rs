//! Covariance kernels and matrix operations for the subgroup synthesis branch.
//!
//! The H < 0.5 branch builds a dense fBm covariance matrix, takes its
//! symmetric square root through an eigendecomposition, and resizes that
//! factor to the subgroup size by bivariate interpolation. Eigenvalue sign
//! handling follows the same tolerance policy as the spectral branch: tiny
//! negative values are floating-point noise and clamp to zero, material
//! negatives mean the covariance is degenerate and the call fails.

use crate::errors::{FractalResult, FractalSeriesError};
use nalgebra::{DMatrix, SymmetricEigen};

/// Autocovariance of fBm increments (fractional Gaussian noise) at lag `k`.
///
/// γ(k) = 0.5 · (|k+1|^(2H) − 2|k|^(2H) + |k−1|^(2H))
pub fn fgn_autocovariance(k: usize, hurst: f64) -> f64 {
    let two_h = 2.0 * hurst;
    let k_f64 = k as f64;
    let k_minus_1 = if k == 0 { 1.0 } else { k_f64 - 1.0 };
    0.5 * ((k_f64 + 1.0).powf(two_h) - 2.0 * k_f64.powf(two_h) + k_minus_1.abs().powf(two_h))
}

/// Covariance kernel of fBm path values: R(t, s) = 0.5 · (s^(2H) + t^(2H) − |t−s|^(2H)).
pub fn fbm_covariance(t: f64, s: f64, hurst: f64) -> f64 {
    let two_h = 2.0 * hurst;
    0.5 * (s.powf(two_h) + t.powf(two_h) - (t - s).abs().powf(two_h))
}

/// Reference covariance matrix Γ with Γ[t, s] = R(t, s) over the integer grid.
pub fn fbm_covariance_matrix(size: usize, hurst: f64) -> DMatrix<f64> {
    DMatrix::from_fn(size, size, |t, s| fbm_covariance(t as f64, s as f64, hurst))
}

/// Symmetric square-root factor Σ of a positive semidefinite matrix.
///
/// Eigendecomposes Γ = Q·diag(w)·Qᵀ and returns Σ = Q·diag(√w)·Qᵀ (Q is
/// orthogonal, so its transpose is its inverse). Eigenvalues below the
/// relative tolerance are a degeneracy error; small negatives within
/// tolerance are clamped to zero before the square root.
pub fn symmetric_sqrt_factor(matrix: DMatrix<f64>) -> FractalResult<DMatrix<f64>> {
    let size = matrix.nrows();
    if size == 0 || matrix.ncols() != size {
        return Err(FractalSeriesError::InvalidParameter {
            parameter: "matrix dimensions".to_string(),
            value: matrix.ncols() as f64,
            constraint: format!("square and non-empty (got {}x{})", size, matrix.ncols()),
        });
    }

    let eigen = SymmetricEigen::new(matrix);

    let max_eigenval = eigen
        .eigenvalues
        .iter()
        .fold(0.0_f64, |acc, &w| acc.max(w.abs()));
    let tolerance = (1e-10 * max_eigenval).max(1e-15);

    let mut sqrt_eigenvalues = eigen.eigenvalues.clone();
    for w in sqrt_eigenvalues.iter_mut() {
        if *w < -tolerance {
            return Err(FractalSeriesError::NumericalDegeneracy {
                reason: format!(
                    "covariance eigenvalue {} below tolerance {}; matrix is not positive semidefinite",
                    w, tolerance
                ),
            });
        }
        if *w < 0.0 {
            log::debug!("clamping negative covariance eigenvalue {} to zero", w);
        }
        *w = w.max(0.0).sqrt();
    }

    let q = eigen.eigenvectors;
    let sqrt_diag = DMatrix::from_diagonal(&sqrt_eigenvalues);
    Ok(&q * sqrt_diag * q.transpose())
}

/// Resize a square matrix to `new_size` by bilinear interpolation over
/// normalized [0, 1] × [0, 1] index grids.
///
/// This approximates the covariance factor at the target scale; it is a
/// resampling of the reference factor, not an exact factorization of the
/// covariance at the new size.
pub fn resize_covariance(sigma: &DMatrix<f64>, new_size: usize) -> FractalResult<DMatrix<f64>> {
    let old_size = sigma.nrows();
    if old_size < 2 || sigma.ncols() != old_size {
        return Err(FractalSeriesError::InvalidParameter {
            parameter: "matrix dimensions".to_string(),
            value: old_size as f64,
            constraint: "square with at least 2 rows".to_string(),
        });
    }
    if new_size < 2 {
        return Err(FractalSeriesError::InvalidParameter {
            parameter: "new_size".to_string(),
            value: new_size as f64,
            constraint: "must be at least 2".to_string(),
        });
    }

    // Maps the normalized target coordinate back onto the source grid and
    // returns (lower index, fractional offset).
    let locate = |i: usize| -> (usize, f64) {
        let pos = i as f64 / (new_size - 1) as f64 * (old_size - 1) as f64;
        let lower = (pos.floor() as usize).min(old_size - 2);
        (lower, pos - lower as f64)
    };

    let mut resized = DMatrix::zeros(new_size, new_size);
    for r in 0..new_size {
        let (r0, fr) = locate(r);
        for c in 0..new_size {
            let (c0, fc) = locate(c);
            let v00 = sigma[(r0, c0)];
            let v01 = sigma[(r0, c0 + 1)];
            let v10 = sigma[(r0 + 1, c0)];
            let v11 = sigma[(r0 + 1, c0 + 1)];
            resized[(r, c)] = v00 * (1.0 - fr) * (1.0 - fc)
                + v01 * (1.0 - fr) * fc
                + v10 * fr * (1.0 - fc)
                + v11 * fr * fc;
        }
    }
    Ok(resized)
}
