use std::f64::consts::PI;

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::{require, ParameterMap};
use glens_core::RngHandle;
use glens_waveform::{frequency_array, Polarizations};
use num_complex::Complex64;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::geometry::{DetectorGeometry, DetectorName, Polarization};
use crate::psd::PowerSpectralDensity;
use crate::time::greenwich_mean_sidereal_time;

/// Frequency-domain data held by one interferometer.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainData {
    /// Sampling frequency (Hz).
    pub sampling_frequency: f64,
    /// Segment duration (s).
    pub duration: f64,
    /// GPS start time of the segment.
    pub start_time: f64,
    /// Frequency grid.
    pub frequencies: Vec<f64>,
    /// Frequency-domain strain.
    pub strain: Vec<Complex64>,
    /// PSD sampled on the grid.
    pub psd: Vec<f64>,
    /// Bins that enter the likelihood.
    pub mask: Vec<bool>,
}

impl StrainData {
    /// Noise-weighted inner product `4/T Re Σ conj(a) b / S` over the masked bins.
    pub fn inner_product(&self, a: &[Complex64], b: &[Complex64]) -> f64 {
        noise_weighted_inner_product(a, b, &self.psd, &self.mask, self.duration)
    }
}

/// Noise-weighted inner product over the bins selected by `mask`.
pub fn noise_weighted_inner_product(
    a: &[Complex64],
    b: &[Complex64],
    psd: &[f64],
    mask: &[bool],
    duration: f64,
) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b)
        .zip(psd.iter().zip(mask))
        .filter(|(_, (_, keep))| **keep)
        .map(|((x, y), (s, _))| (x.conj() * *y).re / *s)
        .sum();
    4.0 / duration * sum
}

/// Signal-to-noise ratios recorded at injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionReport {
    /// Detector name.
    pub detector: String,
    /// Optimal SNR `sqrt(<h, h>)`.
    pub optimal_snr: f64,
    /// Matched-filter SNR `<d, h> / sqrt(<h, h>)` after injection.
    pub matched_filter_snr: f64,
}

/// A single simulated detector.
#[derive(Debug, Clone)]
pub struct Interferometer {
    name: DetectorName,
    geometry: DetectorGeometry,
    psd: PowerSpectralDensity,
    minimum_frequency: f64,
    maximum_frequency: f64,
    data: Option<StrainData>,
}

impl Interferometer {
    /// Detector with its design geometry and PSD.
    pub fn new(name: DetectorName) -> Self {
        Self {
            name,
            geometry: DetectorGeometry::of(name),
            psd: PowerSpectralDensity::design(name),
            minimum_frequency: 20.0,
            maximum_frequency: f64::INFINITY,
            data: None,
        }
    }

    /// Detector name.
    pub fn name(&self) -> DetectorName {
        self.name
    }

    /// Fixed geometry.
    pub fn geometry(&self) -> &DetectorGeometry {
        &self.geometry
    }

    /// Noise curve.
    pub fn power_spectral_density(&self) -> PowerSpectralDensity {
        self.psd
    }

    /// Analysis band `[minimum, maximum]`; the maximum is capped at Nyquist.
    pub fn set_frequency_band(&mut self, minimum: f64, maximum: f64) {
        self.minimum_frequency = minimum;
        self.maximum_frequency = maximum;
    }

    /// Frequency-domain data, once noise has been simulated.
    pub fn strain_data(&self) -> Option<&StrainData> {
        self.data.as_ref()
    }

    pub(crate) fn require_data(&self) -> Result<&StrainData, LensError> {
        self.data.as_ref().ok_or_else(|| {
            LensError::Injection(
                ErrorInfo::new("strain-unset", "interferometer has no strain data")
                    .with_context("detector", self.name.as_str())
                    .with_hint("simulate noise before injecting or analysing"),
            )
        })
    }

    /// Replaces the strain with a Gaussian noise realisation drawn from the PSD.
    pub fn set_noise(
        &mut self,
        sampling_frequency: f64,
        duration: f64,
        start_time: f64,
        rng: &mut RngHandle,
    ) -> Result<(), LensError> {
        let frequencies = frequency_array(duration, sampling_frequency);
        let nyquist = sampling_frequency / 2.0;
        let upper = self.maximum_frequency.min(nyquist);
        let psd = self.psd.sample(&frequencies);
        let mask: Vec<bool> = frequencies
            .iter()
            .zip(&psd)
            .map(|(f, s)| *f >= self.minimum_frequency && *f <= upper && s.is_finite())
            .collect();
        let normal = Normal::new(0.0, 0.5 * duration.sqrt()).map_err(|err| {
            LensError::ValueConversion(
                ErrorInfo::new("invalid-duration", err.to_string())
                    .with_context("duration", duration.to_string()),
            )
        })?;
        let strain = psd
            .iter()
            .zip(&mask)
            .map(|(s, keep)| {
                let white = Complex64::new(normal.sample(rng), normal.sample(rng));
                if *keep {
                    white * s.sqrt()
                } else {
                    Complex64::new(0.0, 0.0)
                }
            })
            .collect();
        self.data = Some(StrainData {
            sampling_frequency,
            duration,
            start_time,
            frequencies,
            strain,
            psd,
            mask,
        });
        Ok(())
    }

    /// Projects polarizations onto this detector, including the arrival delay.
    ///
    /// Needs `ra`, `dec`, `psi` and `geocent_time` in `params`.
    pub fn project(
        &self,
        polarizations: &Polarizations,
        params: &ParameterMap,
    ) -> Result<Vec<Complex64>, LensError> {
        let data = self.require_data()?;
        if polarizations.plus.len() != data.frequencies.len()
            || polarizations.cross.len() != data.frequencies.len()
        {
            return Err(LensError::Injection(
                ErrorInfo::new("grid-mismatch", "waveform grid differs from the detector grid")
                    .with_context("detector", self.name.as_str())
                    .with_context("waveform_bins", polarizations.plus.len().to_string())
                    .with_context("detector_bins", data.frequencies.len().to_string()),
            ));
        }
        let ra = require(params, "ra")?;
        let dec = require(params, "dec")?;
        let psi = require(params, "psi")?;
        let geocent_time = require(params, "geocent_time")?;
        let gmst = greenwich_mean_sidereal_time(geocent_time);
        let f_plus = self
            .geometry
            .antenna_response(ra, dec, psi, gmst, Polarization::Plus);
        let f_cross = self
            .geometry
            .antenna_response(ra, dec, psi, gmst, Polarization::Cross);
        let shift = geocent_time + self.geometry.time_delay_from_geocenter(ra, dec, gmst)
            - data.start_time;
        Ok(data
            .frequencies
            .iter()
            .zip(polarizations.plus.iter().zip(&polarizations.cross))
            .map(|(f, (plus, cross))| {
                (*plus * f_plus + *cross * f_cross) * Complex64::new(0.0, -2.0 * PI * f * shift).exp()
            })
            .collect())
    }

    /// Adds a projected signal to the strain and reports its SNRs.
    pub(crate) fn add_signal(&mut self, signal: &[Complex64]) -> Result<InjectionReport, LensError> {
        let name = self.name;
        let data = self.data.as_mut().ok_or_else(|| {
            LensError::Injection(
                ErrorInfo::new("strain-unset", "interferometer has no strain data")
                    .with_context("detector", name.as_str()),
            )
        })?;
        for (d, h) in data.strain.iter_mut().zip(signal) {
            *d += *h;
        }
        let optimal = data.inner_product(signal, signal).sqrt();
        let matched = if optimal > 0.0 {
            data.inner_product(&data.strain, signal) / optimal
        } else {
            0.0
        };
        Ok(InjectionReport {
            detector: name.as_str().to_string(),
            optimal_snr: optimal,
            matched_filter_snr: matched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_zero_outside_the_band() {
        let mut ifo = Interferometer::new(DetectorName::H1);
        ifo.set_frequency_band(30.0, 100.0);
        let mut rng = RngHandle::from_seed(3);
        ifo.set_noise(512.0, 4.0, 0.0, &mut rng).unwrap();
        let data = ifo.strain_data().unwrap();
        assert_eq!(data.frequencies.len(), 1025);
        for ((f, d), keep) in data.frequencies.iter().zip(&data.strain).zip(&data.mask) {
            if *f < 30.0 || *f > 100.0 {
                assert!(!keep);
                assert_eq!(*d, Complex64::new(0.0, 0.0));
            } else {
                assert!(keep);
            }
        }
    }

    #[test]
    fn whitened_noise_power_matches_expectation() {
        let mut ifo = Interferometer::new(DetectorName::L1);
        ifo.set_frequency_band(20.0, 1024.0);
        let mut rng = RngHandle::from_seed(11);
        ifo.set_noise(2048.0, 8.0, 0.0, &mut rng).unwrap();
        let data = ifo.strain_data().unwrap();
        let bins = data.mask.iter().filter(|keep| **keep).count() as f64;
        // Each complex bin contributes 2 on average.
        let ratio = data.inner_product(&data.strain, &data.strain) / (2.0 * bins);
        assert!((ratio - 1.0).abs() < 0.05, "ratio = {ratio}");
    }

    #[test]
    fn projection_needs_strain_data() {
        let ifo = Interferometer::new(DetectorName::V1);
        let err = ifo
            .project(&Polarizations::default(), &ParameterMap::new())
            .unwrap_err();
        assert_eq!(err.info().code, "strain-unset");
    }
}
