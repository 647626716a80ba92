//! Persistence collaborator for generated series.
//!
//! Lives outside the numeric core: it receives a finished series and writes
//! it to a delimited text file, one value per line, no header. The file name
//! is `{output_dir}{method label}_{n}_{H}.csv`; the directory string is
//! prepended verbatim (no separator is inserted), so callers wanting a
//! directory must pass a trailing slash.

use crate::errors::{FractalResult, FractalSeriesError};
use crate::generator::FbmMethod;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn io_error(operation: &str, source: std::io::Error) -> FractalSeriesError {
    FractalSeriesError::IoError {
        operation: operation.to_string(),
        source: Some(Arc::new(source)),
    }
}

/// File name for a generated series: `{output_dir}{label}_{n}_{H}.csv`.
pub fn series_file_name(output_dir: &str, method: FbmMethod, n: usize, hurst: f64) -> PathBuf {
    PathBuf::from(format!(
        "{}{}_{}_{}.csv",
        output_dir,
        method.label(),
        n,
        hurst
    ))
}

/// Write a generated series to a CSV file, one value per line, no header.
///
/// Returns the path of the written file.
///
/// # Example
/// ```rust,no_run
/// use fractal_series::{generate_fractional_brownian_motion, FbmConfig, FbmMethod, GeneratorConfig};
/// use fractal_series::persistence::write_series_csv;
///
/// let config = GeneratorConfig { length: 1000, seed: Some(7) };
/// let fbm_config = FbmConfig::with_hurst(0.7);
/// let series = generate_fractional_brownian_motion(&config, &fbm_config).unwrap();
/// let method = FbmMethod::for_hurst(fbm_config.hurst_exponent);
/// let path = write_series_csv("out/", method, config.length, 0.7, &series).unwrap();
/// assert_eq!(path.file_name().unwrap(), "spectral_fft_1000_0.7.csv");
/// ```
pub fn write_series_csv(
    output_dir: &str,
    method: FbmMethod,
    n: usize,
    hurst: f64,
    series: &[f64],
) -> FractalResult<PathBuf> {
    let path = series_file_name(output_dir, method, n, hurst);
    let file = File::create(&path)
        .map_err(|e| io_error(&format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);

    for value in series {
        writeln!(writer, "{}", value)
            .map_err(|e| io_error(&format!("write {}", path.display()), e))?;
    }
    writer
        .flush()
        .map_err(|e| io_error(&format!("flush {}", path.display()), e))?;

    Ok(path)
}
