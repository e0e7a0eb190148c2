//! Amplification data provision.
//!
//! A provider turns the run configuration into four file references: the `w`
//! and `y` grids and the real and imaginary parts of the amplification factor.
//! Nothing downstream interprets the files except [`AmplificationTable::load`],
//! which the lensed generator calls at construction.

mod table;

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glens_config::{BilbySetup, DataSettings, LensSettings, RunConfiguration};
use glens_core::errors::{ErrorInfo, LensError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

pub use table::AmplificationTable;

/// Where amplification data is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Generated in-process on the local machine.
    Local,
}

impl FromStr for DeploymentMode {
    type Err = LensError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DeploymentMode::Local),
            other => Err(LensError::Amplification(
                ErrorInfo::new("unsupported-mode", "only local deployment is supported")
                    .with_context("mode", other),
            )),
        }
    }
}

impl Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Local => write!(f, "local"),
        }
    }
}

/// Opaque references to the four amplification data files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplificationFiles {
    /// Dimensionless frequency grid.
    pub w_array: PathBuf,
    /// Impact parameter grid.
    pub y_array: PathBuf,
    /// Real part of the amplification factor.
    pub amp_fac_real: PathBuf,
    /// Imaginary part of the amplification factor.
    pub amp_fac_imag: PathBuf,
}

/// Source of amplification data files.
pub trait AmplificationDataProvider {
    /// Produces (or locates) the amplification data for `config`.
    fn provide(
        &self,
        config: &RunConfiguration,
        mode: DeploymentMode,
    ) -> Result<AmplificationFiles, LensError>;
}

/// Provider that tabulates the point-mass lens in the geometric-optics limit.
///
/// Files live in `outdir/data_subdir`. Existing files are reused, so repeated
/// runs against the same data directory share one set of tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAmplificationProvider;

impl AmplificationDataProvider for LocalAmplificationProvider {
    fn provide(
        &self,
        config: &RunConfiguration,
        mode: DeploymentMode,
    ) -> Result<AmplificationFiles, LensError> {
        let DeploymentMode::Local = mode;
        let setup = BilbySetup::from_config(config)?;
        let data = DataSettings::from_config(config)?;
        let settings = LensSettings::from_config(config)?;
        let data_dir = setup.outdir.join(&data.data_subdir);
        fs::create_dir_all(&data_dir)
            .map_err(|err| LensError::output("data-dir-create", &data_dir, err))?;

        let w_array = match &settings.w_array_file {
            Some(path) => existing(path)?,
            None => {
                let path = data_dir.join("w.dat");
                if !path.is_file() {
                    let grid = log_spaced(settings.min_w, settings.max_w, settings.npoints_w)?;
                    write_column(&path, &grid)?;
                }
                path
            }
        };
        let y_array = match &settings.y_array_file {
            Some(path) => existing(path)?,
            None => {
                let path = data_dir.join("y.dat");
                if !path.is_file() {
                    let grid = linear_spaced(settings.min_y, settings.max_y, settings.npoints_y)?;
                    write_column(&path, &grid)?;
                }
                path
            }
        };

        let files = AmplificationFiles {
            w_array,
            y_array,
            amp_fac_real: data_dir.join("fReal.dat"),
            amp_fac_imag: data_dir.join("fImag.dat"),
        };
        if files.amp_fac_real.is_file() && files.amp_fac_imag.is_file() {
            tracing::info!(dir = %data_dir.display(), "reusing existing amplification tables");
        } else {
            generate_tables(&files)?;
            tracing::info!(dir = %data_dir.display(), "generated amplification tables");
        }
        Ok(files)
    }
}

/// Geometric-optics amplification factor of a point-mass lens.
///
/// `F(w, y) = |mu+|^(1/2) - i |mu-|^(1/2) exp(i w dt)`.
pub fn point_lens_geometric_optics(w: f64, y: f64) -> Complex64 {
    let root = (y * y + 4.0).sqrt();
    let magnification_plus = 0.5 + (y * y + 2.0) / (2.0 * y * root);
    let magnification_minus = 0.5 - (y * y + 2.0) / (2.0 * y * root);
    let time_delay = y * root / 2.0 + ((root + y) / (root - y)).ln();
    let phase = Complex64::new(0.0, w * time_delay).exp();
    Complex64::new(magnification_plus.abs().sqrt(), 0.0)
        - Complex64::new(0.0, magnification_minus.abs().sqrt()) * phase
}

fn generate_tables(files: &AmplificationFiles) -> Result<(), LensError> {
    let w = read_grid(&files.w_array)?;
    let y = read_grid(&files.y_array)?;
    if y.iter().any(|value| *value <= 0.0) {
        return Err(LensError::Amplification(
            ErrorInfo::new("invalid-grid", "impact parameters must be positive")
                .with_context("path", files.y_array.display().to_string()),
        ));
    }
    let mut real = String::new();
    let mut imag = String::new();
    for w_value in &w {
        let row: Vec<Complex64> = y
            .iter()
            .map(|y_value| point_lens_geometric_optics(*w_value, *y_value))
            .collect();
        real.push_str(&join_row(row.iter().map(|value| value.re)));
        imag.push_str(&join_row(row.iter().map(|value| value.im)));
    }
    write_text(&files.amp_fac_real, &real)?;
    write_text(&files.amp_fac_imag, &imag)
}

fn read_grid(path: &Path) -> Result<Vec<f64>, LensError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        LensError::Amplification(
            ErrorInfo::new("table-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    contents
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                LensError::Amplification(
                    ErrorInfo::new("table-parse", "non-numeric grid entry")
                        .with_context("path", path.display().to_string())
                        .with_context("token", token),
                )
            })
        })
        .collect()
}

fn existing(path: &Path) -> Result<PathBuf, LensError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(LensError::Amplification(
            ErrorInfo::new("grid-missing", "user supplied grid file does not exist")
                .with_context("path", path.display().to_string()),
        ))
    }
}

fn bounds_error(min: f64, max: f64, points: usize) -> LensError {
    LensError::Amplification(
        ErrorInfo::new("invalid-grid-bounds", "grid bounds must satisfy 0 < min < max")
            .with_context("min", min.to_string())
            .with_context("max", max.to_string())
            .with_context("points", points.to_string()),
    )
}

fn log_spaced(min: f64, max: f64, points: usize) -> Result<Vec<f64>, LensError> {
    if !(min > 0.0 && max > min) || points < 2 {
        return Err(bounds_error(min, max, points));
    }
    let (lo, hi) = (min.log10(), max.log10());
    let step = (hi - lo) / (points - 1) as f64;
    Ok((0..points)
        .map(|idx| 10f64.powf(lo + step * idx as f64))
        .collect())
}

fn linear_spaced(min: f64, max: f64, points: usize) -> Result<Vec<f64>, LensError> {
    if !(min > 0.0 && max > min) || points < 2 {
        return Err(bounds_error(min, max, points));
    }
    let step = (max - min) / (points - 1) as f64;
    Ok((0..points).map(|idx| min + step * idx as f64).collect())
}

fn join_row(values: impl Iterator<Item = f64>) -> String {
    let mut line = values
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

fn write_column(path: &Path, values: &[f64]) -> Result<(), LensError> {
    let text: String = values.iter().map(|value| format!("{value}\n")).collect();
    write_text(path, &text)
}

fn write_text(path: &Path, text: &str) -> Result<(), LensError> {
    fs::write(path, text).map_err(|err| LensError::output("table-write", path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometric_optics_magnifications_sum_to_unit_difference() {
        // mu+ + mu- = 1 for the point lens.
        let y: f64 = 0.7;
        let root = (y * y + 4.0).sqrt();
        let plus = 0.5 + (y * y + 2.0) / (2.0 * y * root);
        let minus = 0.5 - (y * y + 2.0) / (2.0 * y * root);
        assert!((plus + minus - 1.0).abs() < 1e-12);
        let value = point_lens_geometric_optics(0.0, y);
        assert!((value.re - plus.sqrt()).abs() < 1e-12);
        assert!((value.im + minus.abs().sqrt()).abs() < 1e-12);
    }

    #[test]
    fn amplification_modulus_oscillates_with_frequency() {
        let y = 0.5;
        let moduli: Vec<f64> = (0..200)
            .map(|idx| point_lens_geometric_optics(idx as f64 * 0.1, y).norm())
            .collect();
        let max = moduli.iter().cloned().fold(f64::MIN, f64::max);
        let min = moduli.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max > min + 0.5);
    }

    #[test]
    fn grids_are_monotone_and_span_bounds() {
        let grid = log_spaced(1e-2, 1e2, 5).unwrap();
        assert!((grid[0] - 1e-2).abs() < 1e-15);
        assert!((grid[4] - 1e2).abs() < 1e-9);
        assert!((grid[2] - 1.0).abs() < 1e-12);
        assert!(linear_spaced(1.0, 0.5, 3).is_err());
    }

    #[test]
    fn only_local_mode_parses() {
        assert_eq!("Local".parse::<DeploymentMode>().unwrap(), DeploymentMode::Local);
        assert!("cluster".parse::<DeploymentMode>().is_err());
    }
}
