//! Frequency-domain source models.
//!
//! The binary black hole model is the leading-order stationary-phase inspiral,
//! truncated at the innermost stable circular orbit. The lensed model multiplies
//! both polarizations by the tabulated amplification factor.

use std::f64::consts::PI;

use glens_core::constants::{C, HUBBLE_CONSTANT, MPC_SI, MTSUN_SI};
use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::{require, ParameterMap};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::amplification::AmplificationTable;

/// Plus and cross polarizations sampled on a frequency grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polarizations {
    /// Plus polarization.
    pub plus: Vec<Complex64>,
    /// Cross polarization.
    pub cross: Vec<Complex64>,
}

/// Frequency band over which a model is non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower cut-off (Hz).
    pub minimum: f64,
    /// Upper cut-off (Hz).
    pub maximum: f64,
}

/// Frequency-domain source models known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceModel {
    /// Unlensed binary black hole inspiral.
    LalBinaryBlackHole,
    /// Binary black hole inspiral amplified by a point-mass lens.
    AmplifiedLalBinaryBlackHole,
}

impl SourceModel {
    /// Whether the model consumes amplification tables.
    pub fn is_lensed(&self) -> bool {
        matches!(self, SourceModel::AmplifiedLalBinaryBlackHole)
    }

    /// Evaluates both polarizations for already-converted parameters.
    pub fn evaluate(
        &self,
        frequencies: &[f64],
        params: &ParameterMap,
        band: Band,
        table: Option<&AmplificationTable>,
    ) -> Result<Polarizations, LensError> {
        let mut polarizations = binary_black_hole(frequencies, params, band)?;
        if let SourceModel::AmplifiedLalBinaryBlackHole = self {
            let table = table.ok_or_else(|| {
                LensError::Amplification(ErrorInfo::new(
                    "table-missing",
                    "lensed source model evaluated without amplification tables",
                ))
            })?;
            apply_amplification(frequencies, params, table, &mut polarizations)?;
        }
        Ok(polarizations)
    }
}

/// Innermost stable circular orbit frequency for a total mass in solar masses.
pub fn isco_frequency(total_mass: f64) -> f64 {
    1.0 / (6f64.powf(1.5) * PI * total_mass * MTSUN_SI)
}

fn binary_black_hole(
    frequencies: &[f64],
    params: &ParameterMap,
    band: Band,
) -> Result<Polarizations, LensError> {
    let chirp_mass = require(params, "chirp_mass")? * MTSUN_SI;
    let total_mass = require(params, "mass_1")? + require(params, "mass_2")?;
    let distance = require(params, "luminosity_distance")? * MPC_SI;
    let inclination = require(params, "theta_jn")?;
    let phase = require(params, "phase")?;
    if !(distance > 0.0) {
        return Err(LensError::ValueConversion(
            ErrorInfo::new("invalid-distance", "luminosity distance must be positive")
                .with_context("parameter", "luminosity_distance"),
        ));
    }

    let upper = band.maximum.min(isco_frequency(total_mass));
    let amplitude_scale =
        (5.0_f64 / 24.0).sqrt() * PI.powf(-2.0 / 3.0) * chirp_mass.powf(5.0 / 6.0) * C / distance;
    let cos_iota = inclination.cos();
    let plus_factor = 0.5 * (1.0 + cos_iota * cos_iota);

    let mut polarizations = Polarizations {
        plus: vec![Complex64::new(0.0, 0.0); frequencies.len()],
        cross: vec![Complex64::new(0.0, 0.0); frequencies.len()],
    };
    for (idx, &frequency) in frequencies.iter().enumerate() {
        if frequency < band.minimum || frequency > upper || frequency <= 0.0 {
            continue;
        }
        let amplitude = amplitude_scale * frequency.powf(-7.0 / 6.0);
        let psi = -phase - PI / 4.0 + 3.0 / 128.0 * (PI * chirp_mass * frequency).powf(-5.0 / 3.0);
        let carrier = Complex64::new(0.0, -psi).exp() * amplitude;
        polarizations.plus[idx] = carrier * plus_factor;
        polarizations.cross[idx] = carrier * Complex64::new(0.0, -cos_iota);
    }
    Ok(polarizations)
}

/// Redshifted lens mass in solar masses.
///
/// The lens redshift follows the low-redshift Hubble law applied to the lens
/// distance `lens_fractional_distance * luminosity_distance`.
pub fn redshifted_lens_mass(params: &ParameterMap) -> Result<f64, LensError> {
    let lens_mass = require(params, "lens_mass")?;
    let fraction = require(params, "lens_fractional_distance")?;
    let distance = require(params, "luminosity_distance")?;
    let lens_redshift = HUBBLE_CONSTANT * fraction * distance / (C / 1000.0);
    Ok(lens_mass * (1.0 + lens_redshift))
}

fn apply_amplification(
    frequencies: &[f64],
    params: &ParameterMap,
    table: &AmplificationTable,
    polarizations: &mut Polarizations,
) -> Result<(), LensError> {
    let impact_parameter = require(params, "impact_parameter")?;
    let lens_mass = redshifted_lens_mass(params)?;
    if lens_mass == 0.0 {
        return Ok(());
    }
    let w_scale = 8.0 * PI * lens_mass * MTSUN_SI;
    for (idx, &frequency) in frequencies.iter().enumerate() {
        if polarizations.plus[idx] == Complex64::new(0.0, 0.0)
            && polarizations.cross[idx] == Complex64::new(0.0, 0.0)
        {
            continue;
        }
        let factor = table.evaluate(w_scale * frequency, impact_parameter)?;
        polarizations.plus[idx] *= factor;
        polarizations.cross[idx] *= factor;
    }
    Ok(())
}
