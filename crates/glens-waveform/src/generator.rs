use std::sync::Arc;

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;

use crate::amplification::AmplificationTable;
use crate::arguments::WaveformArguments;
use crate::conversion::ParameterConversion;
use crate::registry::GeneratorClass;
use crate::source::{Band, Polarizations, SourceModel};

/// Frequency grid `f_k = k / duration` for `k = 0..=duration * fs / 2`.
pub fn frequency_array(duration: f64, sampling_frequency: f64) -> Vec<f64> {
    let bins = (duration * sampling_frequency / 2.0).round() as usize + 1;
    (0..bins).map(|k| k as f64 / duration).collect()
}

/// Frequency-domain waveform generator.
///
/// Lensed and unlensed generators built for one run hold the same
/// [`WaveformArguments`] allocation.
#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    class: GeneratorClass,
    source: SourceModel,
    conversion: ParameterConversion,
    duration: f64,
    sampling_frequency: f64,
    frequencies: Vec<f64>,
    arguments: Arc<WaveformArguments>,
    table: Option<Arc<AmplificationTable>>,
}

/// Constructs a generator.
///
/// The lensed generator class reads the amplification tables referenced by
/// `arguments`; nothing is written.
pub fn build(
    class: GeneratorClass,
    duration: f64,
    sampling_frequency: f64,
    source: SourceModel,
    conversion: ParameterConversion,
    arguments: Arc<WaveformArguments>,
) -> Result<WaveformGenerator, LensError> {
    if !(duration > 0.0 && sampling_frequency > 0.0) {
        return Err(LensError::ValueConversion(
            ErrorInfo::new("invalid-sampling", "duration and sampling frequency must be positive")
                .with_context("duration", duration.to_string())
                .with_context("sampling_frequency", sampling_frequency.to_string()),
        ));
    }
    let upper = arguments.maximum_frequency_for(sampling_frequency);
    if arguments.minimum_frequency >= upper {
        return Err(LensError::ValueConversion(
            ErrorInfo::new(
                "invalid-frequency-band",
                "minimum_frequency must lie below the Nyquist-limited maximum frequency",
            )
            .with_context("minimum_frequency", arguments.minimum_frequency.to_string())
            .with_context("maximum_frequency", upper.to_string())
            .with_context("sampling_frequency", sampling_frequency.to_string()),
        ));
    }
    let table = match class {
        GeneratorClass::Default => None,
        GeneratorClass::Lensed => Some(Arc::new(AmplificationTable::load(&arguments.files)?)),
    };
    tracing::debug!(
        generator = %class,
        source = %source,
        conversion = conversion.name(),
        duration,
        sampling_frequency,
        "built waveform generator"
    );
    Ok(WaveformGenerator {
        class,
        source,
        conversion,
        duration,
        sampling_frequency,
        frequencies: frequency_array(duration, sampling_frequency),
        arguments,
        table,
    })
}

impl WaveformGenerator {
    /// Generator class this instance was built from.
    pub fn generator_class(&self) -> GeneratorClass {
        self.class
    }

    /// Source model evaluated by this generator.
    pub fn source_model(&self) -> SourceModel {
        self.source
    }

    /// Conversion applied before evaluation.
    pub fn conversion(&self) -> ParameterConversion {
        self.conversion
    }

    /// Segment duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Sampling frequency in Hz.
    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Frequency grid shared with the detectors.
    pub fn frequency_array(&self) -> &[f64] {
        &self.frequencies
    }

    /// Shared waveform arguments.
    pub fn arguments(&self) -> &Arc<WaveformArguments> {
        &self.arguments
    }

    /// Amplification tables loaded by the lensed generator class.
    pub fn amplification_table(&self) -> Option<&AmplificationTable> {
        self.table.as_deref()
    }

    /// Band over which the source model is evaluated.
    pub fn band(&self) -> Band {
        Band {
            minimum: self.arguments.minimum_frequency,
            maximum: self.arguments.maximum_frequency_for(self.sampling_frequency),
        }
    }

    /// Converts `params` and evaluates both polarizations on the frequency grid.
    pub fn frequency_domain_strain(&self, params: &ParameterMap) -> Result<Polarizations, LensError> {
        let converted = self.conversion.convert(params)?;
        self.source.evaluate(
            &self.frequencies,
            &converted,
            self.band(),
            self.amplification_table(),
        )
    }
}
