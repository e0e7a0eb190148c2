use std::fs;
use std::path::Path;

use glens_core::errors::{ErrorInfo, LensError};
use num_complex::Complex64;

use super::AmplificationFiles;

/// Complex amplification factor tabulated on a `(w, y)` grid.
///
/// Rows index the dimensionless frequency `w`, columns the impact parameter `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplificationTable {
    w: Vec<f64>,
    y: Vec<f64>,
    values: Vec<Complex64>,
}

impl AmplificationTable {
    /// Builds a table from grids and a row-major value matrix.
    pub fn new(w: Vec<f64>, y: Vec<f64>, values: Vec<Complex64>) -> Result<Self, LensError> {
        check_grid("w", &w)?;
        check_grid("y", &y)?;
        if values.len() != w.len() * y.len() {
            return Err(LensError::Amplification(
                ErrorInfo::new("table-shape", "table size does not match grid sizes")
                    .with_context("w_points", w.len().to_string())
                    .with_context("y_points", y.len().to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        Ok(Self { w, y, values })
    }

    /// Reads the four files produced by an amplification provider.
    pub fn load(files: &AmplificationFiles) -> Result<Self, LensError> {
        let w = read_column(&files.w_array)?;
        let y = read_column(&files.y_array)?;
        let real = read_matrix(&files.amp_fac_real, w.len(), y.len())?;
        let imag = read_matrix(&files.amp_fac_imag, w.len(), y.len())?;
        let values = real
            .into_iter()
            .zip(imag)
            .map(|(re, im)| Complex64::new(re, im))
            .collect();
        Self::new(w, y, values)
    }

    /// Dimensionless frequency grid.
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// Impact parameter grid.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Tabulated value at grid indices `(i, j)`.
    pub fn at(&self, i: usize, j: usize) -> Complex64 {
        self.values[i * self.y.len() + j]
    }

    /// Bilinear interpolation of the amplification factor, clamped to the grid.
    ///
    /// Fails with [`LensError::Amplification`] when either coordinate is not finite.
    pub fn evaluate(&self, w: f64, y: f64) -> Result<Complex64, LensError> {
        if !w.is_finite() || !y.is_finite() {
            return Err(LensError::Amplification(
                ErrorInfo::new("non-finite-query", "amplification lookup needs finite coordinates")
                    .with_context("w", w.to_string())
                    .with_context("y", y.to_string()),
            ));
        }
        let (i, tw) = locate(&self.w, w);
        let (j, ty) = locate(&self.y, y);
        let f00 = self.at(i, j);
        let f01 = self.at(i, j + 1);
        let f10 = self.at(i + 1, j);
        let f11 = self.at(i + 1, j + 1);
        Ok(f00 * (1.0 - tw) * (1.0 - ty) + f01 * (1.0 - tw) * ty + f10 * tw * (1.0 - ty) + f11 * tw * ty)
    }
}

/// Returns the lower cell index and the fractional offset within the cell.
fn locate(grid: &[f64], x: f64) -> (usize, f64) {
    let last = grid.len() - 1;
    if x <= grid[0] {
        return (0, 0.0);
    }
    if x >= grid[last] {
        return (last - 1, 1.0);
    }
    let upper = grid.partition_point(|value| *value <= x);
    let lower = upper - 1;
    let t = (x - grid[lower]) / (grid[upper] - grid[lower]);
    (lower, t)
}

fn check_grid(name: &str, grid: &[f64]) -> Result<(), LensError> {
    let increasing = grid.windows(2).all(|pair| pair[1] > pair[0]);
    if grid.len() < 2 || !increasing || grid.iter().any(|v| !v.is_finite()) {
        return Err(LensError::Amplification(
            ErrorInfo::new(
                "invalid-grid",
                "grid must hold at least two finite, strictly increasing values",
            )
            .with_context("grid", name),
        ));
    }
    Ok(())
}

fn read_numbers(path: &Path) -> Result<Vec<Vec<f64>>, LensError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        LensError::Amplification(
            ErrorInfo::new("table-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| {
                        LensError::Amplification(
                            ErrorInfo::new("table-parse", "non-numeric table entry")
                                .with_context("path", path.display().to_string())
                                .with_context("token", token),
                        )
                    })
                })
                .collect()
        })
        .collect()
}

fn read_column(path: &Path) -> Result<Vec<f64>, LensError> {
    Ok(read_numbers(path)?.into_iter().flatten().collect())
}

fn read_matrix(path: &Path, rows: usize, cols: usize) -> Result<Vec<f64>, LensError> {
    let numbers = read_numbers(path)?;
    if numbers.len() != rows || numbers.iter().any(|row| row.len() != cols) {
        return Err(LensError::Amplification(
            ErrorInfo::new("table-shape", "table shape does not match the (w, y) grids")
                .with_context("path", path.display().to_string())
                .with_context("expected", format!("{rows}x{cols}")),
        ));
    }
    Ok(numbers.into_iter().flatten().collect())
}
