use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use glens_detector::{InterferometerNetwork, StrainData};
use glens_waveform::WaveformGenerator;

/// Log-likelihood evaluated by the samplers.
pub trait Likelihood {
    /// Log-likelihood of `params`.
    fn log_likelihood(&self, params: &ParameterMap) -> Result<f64, LensError>;

    /// Log-likelihood of the data under the noise-only model.
    fn noise_log_likelihood(&self) -> f64;

    /// Digest of the data the likelihood reads, when it reads detector data.
    fn data_digest(&self) -> Result<Option<String>, LensError> {
        Ok(None)
    }
}

/// Stationary Gaussian noise likelihood over an injected network.
///
/// The network is borrowed, so every likelihood built for a run reads the same
/// strain.
#[derive(Debug)]
pub struct GravitationalWaveLikelihood<'a> {
    network: &'a InterferometerNetwork,
    generator: &'a WaveformGenerator,
    noise_log_likelihood: f64,
}

impl<'a> GravitationalWaveLikelihood<'a> {
    /// Pairs `network` with `generator`; both must share one frequency grid.
    pub fn new(
        network: &'a InterferometerNetwork,
        generator: &'a WaveformGenerator,
    ) -> Result<Self, LensError> {
        let mut noise_log_likelihood = 0.0;
        for ifo in network.interferometers() {
            let data = strain(ifo.strain_data(), ifo.name().as_str())?;
            if data.frequencies.len() != generator.frequency_array().len() {
                return Err(LensError::Injection(
                    ErrorInfo::new("grid-mismatch", "generator grid differs from the detector grid")
                        .with_context("detector", ifo.name().as_str())
                        .with_context("generator_bins", generator.frequency_array().len().to_string())
                        .with_context("detector_bins", data.frequencies.len().to_string()),
                ));
            }
            noise_log_likelihood -= 0.5 * data.inner_product(&data.strain, &data.strain);
        }
        Ok(Self {
            network,
            generator,
            noise_log_likelihood,
        })
    }

    /// Waveform generator of this hypothesis.
    pub fn generator(&self) -> &WaveformGenerator {
        self.generator
    }

    /// Log-likelihood ratio against the noise-only model.
    pub fn log_likelihood_ratio(&self, params: &ParameterMap) -> Result<f64, LensError> {
        let polarizations = self.generator.frequency_domain_strain(params)?;
        let mut ratio = 0.0;
        for ifo in self.network.interferometers() {
            let data = strain(ifo.strain_data(), ifo.name().as_str())?;
            let signal = ifo.project(&polarizations, params)?;
            ratio += data.inner_product(&data.strain, &signal) - 0.5 * data.inner_product(&signal, &signal);
        }
        Ok(ratio)
    }
}

fn strain<'d>(data: Option<&'d StrainData>, detector: &str) -> Result<&'d StrainData, LensError> {
    data.ok_or_else(|| {
        LensError::Injection(
            ErrorInfo::new("strain-unset", "interferometer has no strain data")
                .with_context("detector", detector),
        )
    })
}

impl Likelihood for GravitationalWaveLikelihood<'_> {
    fn log_likelihood(&self, params: &ParameterMap) -> Result<f64, LensError> {
        Ok(self.noise_log_likelihood + self.log_likelihood_ratio(params)?)
    }

    fn noise_log_likelihood(&self) -> f64 {
        self.noise_log_likelihood
    }

    fn data_digest(&self) -> Result<Option<String>, LensError> {
        self.network.strain_digest().map(Some)
    }
}
