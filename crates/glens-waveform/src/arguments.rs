use glens_config::sections::WAVEFORM_ARGUMENTS;
use glens_config::{value, RunConfiguration};
use glens_core::errors::{ErrorInfo, LensError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::amplification::AmplificationFiles;

/// Keys of the `waveform_arguments` section that are coerced to floats.
pub const FLOAT_KEYS: [&str; 3] = ["reference_frequency", "minimum_frequency", "maximum_frequency"];

/// Static waveform arguments merged with the amplification file references.
///
/// One instance is shared by the lensed and unlensed generators, so both are
/// evaluated against the same amplification data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformArguments {
    /// Frequency at which the phase is referenced (Hz).
    pub reference_frequency: f64,
    /// Lower frequency cut-off of the model (Hz).
    pub minimum_frequency: f64,
    /// Upper frequency cut-off of the model (Hz); the Nyquist frequency when absent.
    pub maximum_frequency: Option<f64>,
    /// Remaining entries passed through as text.
    pub extra: IndexMap<String, String>,
    /// Amplification data references.
    pub files: AmplificationFiles,
}

impl WaveformArguments {
    /// Merges the `waveform_arguments` section with `files`.
    pub fn from_config(
        config: &RunConfiguration,
        files: AmplificationFiles,
    ) -> Result<Self, LensError> {
        let section = config.section(WAVEFORM_ARGUMENTS)?;
        let mut extra = IndexMap::new();
        for (key, raw) in section.entries() {
            if !FLOAT_KEYS.contains(&key) {
                extra.insert(key.to_string(), value::as_text(WAVEFORM_ARGUMENTS, key, raw)?);
            }
        }
        let arguments = Self {
            reference_frequency: section.get_float("reference_frequency")?,
            minimum_frequency: section.get_float("minimum_frequency")?,
            maximum_frequency: section.opt_float("maximum_frequency")?,
            extra,
            files,
        };
        arguments.validate()?;
        Ok(arguments)
    }

    /// Upper cut-off for a grid sampled at `sampling_frequency`.
    pub fn maximum_frequency_for(&self, sampling_frequency: f64) -> f64 {
        let nyquist = sampling_frequency / 2.0;
        self.maximum_frequency
            .map_or(nyquist, |maximum| maximum.min(nyquist))
    }

    fn validate(&self) -> Result<(), LensError> {
        let upper = self.maximum_frequency.unwrap_or(f64::INFINITY);
        if !(self.minimum_frequency >= 0.0) || upper <= self.minimum_frequency {
            return Err(LensError::ValueConversion(
                ErrorInfo::new(
                    "invalid-frequency-band",
                    "minimum_frequency must be non-negative and below maximum_frequency",
                )
                .with_context("section", WAVEFORM_ARGUMENTS)
                .with_context("minimum_frequency", self.minimum_frequency.to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn files() -> AmplificationFiles {
        AmplificationFiles {
            w_array: PathBuf::from("w.dat"),
            y_array: PathBuf::from("y.dat"),
            amp_fac_real: PathBuf::from("fReal.dat"),
            amp_fac_imag: PathBuf::from("fImag.dat"),
        }
    }

    #[test]
    fn declared_keys_become_floats_and_others_pass_through() {
        let config = RunConfiguration::parse(
            "[waveform_arguments]\nwaveform_approximant = \"IMRPhenomXP\"\nreference_frequency = \"50\"\nminimum_frequency = 20\n",
        )
        .unwrap();
        let arguments = WaveformArguments::from_config(&config, files()).unwrap();
        assert_eq!(arguments.reference_frequency, 50.0);
        assert_eq!(arguments.minimum_frequency, 20.0);
        assert_eq!(arguments.extra["waveform_approximant"], "IMRPhenomXP");
        assert_eq!(arguments.maximum_frequency_for(1024.0), 512.0);
    }

    #[test]
    fn inverted_band_is_rejected() {
        let config = RunConfiguration::parse(
            "[waveform_arguments]\nreference_frequency = 50\nminimum_frequency = 300\nmaximum_frequency = 100\n",
        )
        .unwrap();
        let err = WaveformArguments::from_config(&config, files()).unwrap_err();
        assert_eq!(err.info().code, "invalid-frequency-band");
    }
}
