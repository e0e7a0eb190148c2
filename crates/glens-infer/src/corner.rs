//! Histogram data behind a corner plot.

use glens_core::params::ParameterMap;
use serde::{Deserialize, Serialize};

/// Bins per axis.
pub const CORNER_BINS: usize = 20;

/// One-dimensional marginal histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marginal {
    /// Parameter name.
    pub parameter: String,
    /// Bin edges, `bins + 1` values.
    pub edges: Vec<f64>,
    /// Sample counts per bin.
    pub counts: Vec<u64>,
}

/// Two-dimensional histogram of a parameter pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Horizontal-axis parameter.
    pub x: String,
    /// Vertical-axis parameter.
    pub y: String,
    /// Counts indexed `[x_bin][y_bin]`.
    pub counts: Vec<Vec<u64>>,
}

/// Marginals for every parameter and joints for every pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerData {
    /// Diagonal panels.
    pub marginals: Vec<Marginal>,
    /// Lower-triangle panels.
    pub joints: Vec<Joint>,
}

/// Bins the posterior draws over `parameters`.
pub fn corner_data(posterior: &[ParameterMap], parameters: &[String]) -> CornerData {
    let columns: Vec<Vec<f64>> = parameters
        .iter()
        .map(|name| posterior.iter().filter_map(|draw| draw.get(name).copied()).collect())
        .collect();
    let edges: Vec<Vec<f64>> = columns.iter().map(|column| bin_edges(column)).collect();
    let marginals = parameters
        .iter()
        .zip(columns.iter().zip(&edges))
        .map(|(name, (column, edges))| {
            let mut counts = vec![0u64; CORNER_BINS];
            for value in column {
                counts[bin_index(edges, *value)] += 1;
            }
            Marginal {
                parameter: name.clone(),
                edges: edges.clone(),
                counts,
            }
        })
        .collect();
    let mut joints = Vec::new();
    for i in 0..parameters.len() {
        for j in 0..i {
            let mut counts = vec![vec![0u64; CORNER_BINS]; CORNER_BINS];
            for (x, y) in columns[j].iter().zip(&columns[i]) {
                counts[bin_index(&edges[j], *x)][bin_index(&edges[i], *y)] += 1;
            }
            joints.push(Joint {
                x: parameters[j].clone(),
                y: parameters[i].clone(),
                counts,
            });
        }
    }
    CornerData { marginals, joints }
}

fn bin_edges(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if max > min {
        (min, max)
    } else {
        (min - 0.5, min + 0.5)
    };
    let width = (hi - lo) / CORNER_BINS as f64;
    (0..=CORNER_BINS).map(|k| lo + width * k as f64).collect()
}

fn bin_index(edges: &[f64], value: f64) -> usize {
    let lo = edges[0];
    let hi = edges[CORNER_BINS];
    let scaled = (value - lo) / (hi - lo) * CORNER_BINS as f64;
    (scaled.max(0.0) as usize).min(CORNER_BINS - 1)
}
