use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use glens_core::rng::NOISE_STREAM;
use glens_core::RngHandle;
use glens_waveform::WaveformGenerator;
use sha2::{Digest, Sha256};

use crate::geometry::DetectorName;
use crate::interferometer::{InjectionReport, Interferometer};

/// Seconds of data kept before the coalescence time.
pub const PRE_MERGER_BUFFER: f64 = 3.0;

/// Ordered set of simulated detectors sharing one noise and signal realisation.
///
/// The network accepts exactly one injection. After [`inject`] returns, the
/// strain is read-only for every consumer.
///
/// [`inject`]: InterferometerNetwork::inject
#[derive(Debug, Clone)]
pub struct InterferometerNetwork {
    interferometers: Vec<Interferometer>,
    injected: bool,
}

impl InterferometerNetwork {
    /// Builds the network in the order given; repeated names are kept once.
    pub fn build_network<S: AsRef<str>>(names: &[S]) -> Result<Self, LensError> {
        let mut interferometers: Vec<Interferometer> = Vec::with_capacity(names.len());
        for name in names {
            let name: DetectorName = name.as_ref().parse()?;
            if interferometers.iter().any(|ifo| ifo.name() == name) {
                tracing::warn!(detector = %name, "detector listed twice; keeping the first entry");
                continue;
            }
            interferometers.push(Interferometer::new(name));
        }
        if interferometers.is_empty() {
            return Err(LensError::UnknownDetector(ErrorInfo::new(
                "empty-network",
                "at least one detector is required",
            )));
        }
        Ok(Self {
            interferometers,
            injected: false,
        })
    }

    /// Detectors in network order.
    pub fn interferometers(&self) -> &[Interferometer] {
        &self.interferometers
    }

    /// Detector names in network order.
    pub fn names(&self) -> Vec<String> {
        self.interferometers
            .iter()
            .map(|ifo| ifo.name().to_string())
            .collect()
    }

    /// Number of detectors.
    pub fn len(&self) -> usize {
        self.interferometers.len()
    }

    /// Whether the network has no detectors.
    pub fn is_empty(&self) -> bool {
        self.interferometers.is_empty()
    }

    /// Whether the signal has been injected.
    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Sets the analysis band of every detector.
    pub fn set_frequency_band(&mut self, minimum: f64, maximum: f64) {
        for ifo in &mut self.interferometers {
            ifo.set_frequency_band(minimum, maximum);
        }
    }

    /// Fills every detector with a noise realisation drawn from its PSD.
    ///
    /// Detector `i` draws from substream `i` of the noise stream of `seed`.
    pub fn simulate_noise(
        &mut self,
        sampling_frequency: f64,
        duration: f64,
        start_time: f64,
        seed: u64,
    ) -> Result<(), LensError> {
        if self.injected {
            return Err(already_injected("simulate_noise"));
        }
        for (index, ifo) in self.interferometers.iter_mut().enumerate() {
            let mut rng = RngHandle::substream(seed, NOISE_STREAM, index as u64);
            ifo.set_noise(sampling_frequency, duration, start_time, &mut rng)?;
        }
        tracing::info!(
            detectors = ?self.names(),
            sampling_frequency,
            duration,
            start_time,
            "simulated detector noise"
        );
        Ok(())
    }

    /// Adds the signal modelled by `generator` at `params` to every detector.
    ///
    /// A network accepts one injection; a second call fails with
    /// [`LensError::Injection`] and leaves the strain untouched.
    pub fn inject(
        &mut self,
        generator: &WaveformGenerator,
        params: &ParameterMap,
    ) -> Result<Vec<InjectionReport>, LensError> {
        if self.injected {
            return Err(already_injected("inject"));
        }
        let polarizations = generator.frequency_domain_strain(params)?;
        let signals = self
            .interferometers
            .iter()
            .map(|ifo| ifo.project(&polarizations, params))
            .collect::<Result<Vec<_>, _>>()?;
        let mut reports = Vec::with_capacity(signals.len());
        for (ifo, signal) in self.interferometers.iter_mut().zip(&signals) {
            let report = ifo.add_signal(signal)?;
            tracing::info!(
                detector = %report.detector,
                optimal_snr = report.optimal_snr,
                matched_filter_snr = report.matched_filter_snr,
                "injected signal"
            );
            reports.push(report);
        }
        self.injected = true;
        let network_snr = reports
            .iter()
            .map(|report| report.optimal_snr * report.optimal_snr)
            .sum::<f64>()
            .sqrt();
        tracing::info!(network_optimal_snr = network_snr, "injection complete");
        Ok(reports)
    }

    /// SHA-256 over every detector's frequency-domain strain, hex encoded.
    pub fn strain_digest(&self) -> Result<String, LensError> {
        let mut hasher = Sha256::new();
        for ifo in &self.interferometers {
            let data = ifo.require_data()?;
            hasher.update(ifo.name().as_str().as_bytes());
            hasher.update((data.strain.len() as u64).to_le_bytes());
            for value in &data.strain {
                hasher.update(value.re.to_le_bytes());
                hasher.update(value.im.to_le_bytes());
            }
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

fn already_injected(operation: &str) -> LensError {
    LensError::Injection(
        ErrorInfo::new("already-injected", "the network already carries an injected signal")
            .with_context("operation", operation)
            .with_hint("build a new network for a new injection"),
    )
}
