//! Error types and validation functions for fBm synthesis and DFA estimation.
//!
//! Two failure families exist: precondition violations (bad parameters,
//! series too short) and numerical degeneracies (covariance structures that
//! stop being positive semidefinite, regressions with too few points).
//! Both fail fast at the point of detection; nothing is silently downgraded
//! to approximate output.

use std::sync::Arc;
use thiserror::Error;

/// Error types for generation and analysis operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum FractalSeriesError {
    /// Insufficient data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical degeneracy detected during computation.
    ///
    /// Raised when the spectral power or a covariance eigenvalue is materially
    /// negative beyond floating-point tolerance, or when a regression becomes
    /// undefined. These conditions are never recovered locally.
    #[error("Numerical degeneracy: {reason}")]
    NumericalDegeneracy {
        /// Detailed reason for the degeneracy
        reason: String,
    },

    /// I/O failure in the persistence collaborator.
    #[error("I/O operation failed: {operation}")]
    IoError {
        /// I/O operation that failed
        operation: String,
        /// Underlying error if available
        #[source]
        source: Option<Arc<std::io::Error>>,
    },
}

/// Result type for generation and analysis operations.
pub type FractalResult<T> = Result<T, FractalSeriesError>;

/// Validates that data has sufficient length for an operation.
///
/// # Example
/// ```rust
/// use fractal_series::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> FractalResult<()> {
    if data.len() < min_required {
        Err(FractalSeriesError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a Hurst exponent lies strictly inside the open interval (0, 1).
///
/// The boundary values 0 and 1 are rejected: at H = 0 the increment process
/// degenerates and at H = 1 the covariance kernel loses full rank.
///
/// # Example
/// ```rust
/// use fractal_series::errors::validate_hurst_exponent;
///
/// assert!(validate_hurst_exponent(0.5).is_ok());
/// assert!(validate_hurst_exponent(0.0).is_err());
/// assert!(validate_hurst_exponent(1.0).is_err());
/// ```
pub fn validate_hurst_exponent(hurst: f64) -> FractalResult<()> {
    if !hurst.is_finite() || hurst <= 0.0 || hurst >= 1.0 {
        return Err(FractalSeriesError::InvalidParameter {
            parameter: "hurst_exponent".to_string(),
            value: hurst,
            constraint: "must lie strictly inside (0, 1)".to_string(),
        });
    }
    Ok(())
}

/// Validates that all values in a slice are finite.
///
/// Returns immediately on the first non-finite value.
///
/// # Example
/// ```rust
/// use fractal_series::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0], "series").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN], "series").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> FractalResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        return Err(FractalSeriesError::NumericalDegeneracy {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_data_length() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(validate_data_length(&data, 3).is_ok());

        match validate_data_length(&data, 5) {
            Err(FractalSeriesError::InsufficientData { required, actual }) => {
                assert_eq!(required, 5);
                assert_eq!(actual, 3);
            }
            _ => panic!("Expected InsufficientData error"),
        }
    }

    #[test]
    fn test_validate_hurst_open_interval() {
        assert!(validate_hurst_exponent(0.01).is_ok());
        assert!(validate_hurst_exponent(0.5).is_ok());
        assert!(validate_hurst_exponent(0.99).is_ok());

        for bad in [0.0, 1.0, -0.2, 1.3, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    validate_hurst_exponent(bad),
                    Err(FractalSeriesError::InvalidParameter { .. })
                ),
                "H = {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        let bad_data = vec![1.0, 2.0, f64::NAN, 4.0];
        match validate_all_finite(&bad_data, "test_array") {
            Err(FractalSeriesError::NumericalDegeneracy { reason }) => {
                assert!(reason.contains("test_array"));
                assert!(reason.contains("index 2"));
            }
            _ => panic!("Expected NumericalDegeneracy error"),
        }
    }

    #[test]
    fn test_error_display_formatting() {
        let err = FractalSeriesError::InvalidParameter {
            parameter: "hurst_exponent".to_string(),
            value: 1.5,
            constraint: "must lie strictly inside (0, 1)".to_string(),
        };
        let message = format!("{}", err);
        assert!(message.contains("hurst_exponent"));
        assert!(message.contains("1.5"));

        let err = FractalSeriesError::NumericalDegeneracy {
            reason: "eigenvalue -0.3 below tolerance".to_string(),
        };
        assert!(format!("{}", err).contains("eigenvalue -0.3"));
    }
}
