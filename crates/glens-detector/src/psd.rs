//! Analytic noise power spectral densities.

use serde::{Deserialize, Serialize};

use crate::geometry::DetectorName;

/// Design-sensitivity noise curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum PowerSpectralDensity {
    /// Advanced LIGO zero-detuned high-power fit, scaled by `scale`.
    AdvancedLigoFit {
        /// Multiplicative factor on the PSD.
        scale: f64,
    },
}

/// Frequency below which the analytic fits are not trusted (Hz).
pub const LOW_FREQUENCY_CUTOFF: f64 = 10.0;

/// Knee frequency of the LIGO fit (Hz).
const KNEE_FREQUENCY: f64 = 215.0;

impl PowerSpectralDensity {
    /// Design curve for a detector.
    pub fn design(name: DetectorName) -> Self {
        let scale = match name {
            DetectorName::H1 | DetectorName::L1 => 1.0,
            DetectorName::V1 => 2.25,
            DetectorName::K1 => 4.0,
        };
        PowerSpectralDensity::AdvancedLigoFit { scale }
    }

    /// One-sided PSD at `frequency` (Hz^-1); infinite below the cut-off.
    pub fn evaluate(&self, frequency: f64) -> f64 {
        if frequency < LOW_FREQUENCY_CUTOFF {
            return f64::INFINITY;
        }
        match self {
            PowerSpectralDensity::AdvancedLigoFit { scale } => {
                let x = frequency / KNEE_FREQUENCY;
                let x2 = x * x;
                let shape = x.powf(-4.14) - 5.0 / x2
                    + 111.0 * (1.0 - x2 + 0.5 * x2 * x2) / (1.0 + 0.5 * x2);
                scale * 1e-49 * shape
            }
        }
    }

    /// PSD sampled on `frequencies`.
    pub fn sample(&self, frequencies: &[f64]) -> Vec<f64> {
        frequencies.iter().map(|f| self.evaluate(*f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligo_fit_is_positive_in_band() {
        let psd = PowerSpectralDensity::design(DetectorName::H1);
        for step in 0..400 {
            let value = psd.evaluate(LOW_FREQUENCY_CUTOFF + step as f64 * 5.0);
            assert!(value.is_finite() && value > 0.0);
        }
        assert!(psd.evaluate(5.0).is_infinite());
    }

    #[test]
    fn bucket_is_deeper_than_the_seismic_wall() {
        let psd = PowerSpectralDensity::design(DetectorName::L1);
        assert!(psd.evaluate(150.0) < psd.evaluate(15.0));
    }

    #[test]
    fn virgo_is_less_sensitive_than_ligo() {
        let ligo = PowerSpectralDensity::design(DetectorName::H1).evaluate(100.0);
        let virgo = PowerSpectralDensity::design(DetectorName::V1).evaluate(100.0);
        assert!((virgo / ligo - 2.25).abs() < 1e-12);
    }
}
