//! Shared numerical routines: series integration, ordinary least squares,
//! and polynomial detrending residuals.

use crate::errors::{FractalResult, FractalSeriesError};
use nalgebra::{DMatrix, DVector};

/// Arithmetic mean of a slice. Returns 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Cumulative sum of a series (the integrated profile).
pub fn integrate_series(data: &[f64]) -> Vec<f64> {
    let mut integrated = Vec::with_capacity(data.len());
    let mut cumsum = 0.0;
    for &value in data {
        cumsum += value;
        integrated.push(cumsum);
    }
    integrated
}

/// Ordinary least squares fit of a line y = slope * x + intercept.
///
/// Returns `(slope, intercept, residuals)`. Two points are the minimum: the
/// fit is then exact, which is acceptable for the DFA scale regression where
/// two schedule entries are the documented lower bound.
///
/// Data is centered before the sums are accumulated so that large offsets
/// with small spread do not cancel catastrophically.
pub fn ols_regression(x: &[f64], y: &[f64]) -> FractalResult<(f64, f64, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(FractalSeriesError::InvalidParameter {
            parameter: "regression inputs".to_string(),
            value: y.len() as f64,
            constraint: format!("y length must equal x length ({})", x.len()),
        });
    }
    if x.len() < 2 {
        return Err(FractalSeriesError::InsufficientData {
            required: 2,
            actual: x.len(),
        });
    }

    if !x.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(FractalSeriesError::NumericalDegeneracy {
            reason: "non-finite values in regression data".to_string(),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sxx: f64 = x
        .iter()
        .map(|xi| {
            let centered = xi - mean_x;
            centered * centered
        })
        .sum();

    if sxx < 1e-12 {
        return Err(FractalSeriesError::NumericalDegeneracy {
            reason: "predictor variable has zero variance (constant values)".to_string(),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    if !slope.is_finite() || !intercept.is_finite() {
        return Err(FractalSeriesError::NumericalDegeneracy {
            reason: "non-finite regression coefficients computed".to_string(),
        });
    }

    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| yi - (slope * xi + intercept))
        .collect();

    Ok((slope, intercept, residuals))
}

/// Sum of squared residuals of a degree-`order` polynomial least-squares fit.
///
/// The abscissa is the window's local index positions, centered and scaled to
/// [-1, 1]; polynomial least squares is invariant under this affine change of
/// variable, and conditioning of the design matrix improves considerably.
///
/// Order 0 fits a constant (the window mean). Order 1 takes the direct OLS
/// path; higher orders go through an SVD least-squares solve of the
/// Vandermonde system.
pub fn polynomial_fit_ssr(window: &[f64], order: usize) -> FractalResult<f64> {
    let n = window.len();
    if n < order + 2 {
        return Err(FractalSeriesError::InsufficientData {
            required: order + 2,
            actual: n,
        });
    }

    if order == 0 {
        let m = mean(window);
        return Ok(window.iter().map(|y| (y - m) * (y - m)).sum());
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let x_scale = (n - 1) as f64 / 2.0;

    if order == 1 {
        let x_vals: Vec<f64> = (0..n).map(|i| (i as f64 - x_mean) / x_scale).collect();
        let (_, _, residuals) = ols_regression(&x_vals, window)?;
        return Ok(residuals.iter().map(|r| r * r).sum());
    }

    // Vandermonde design in the scaled variable, solved by SVD.
    let design = DMatrix::from_fn(n, order + 1, |i, j| {
        let x_scaled = (i as f64 - x_mean) / x_scale;
        x_scaled.powi(j as i32)
    });
    let rhs = DVector::from_column_slice(window);

    let svd = design.clone().svd(true, true);
    let coeffs = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| FractalSeriesError::NumericalDegeneracy {
            reason: format!("polynomial least-squares solve failed: {}", e),
        })?;

    let fitted = design * &coeffs;
    let ssr = rhs
        .iter()
        .zip(fitted.iter())
        .map(|(y, f)| (y - f) * (y - f))
        .sum();
    Ok(ssr)
}
