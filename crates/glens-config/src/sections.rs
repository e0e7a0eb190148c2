//! Typed views over the recognised configuration sections.

use std::path::PathBuf;

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::rng::DEFAULT_MASTER_SEED;
use indexmap::IndexMap;

use crate::configuration::RunConfiguration;
use crate::value;

/// General run layout, detector and sampler selection.
pub const BILBY_SETUP: &str = "bilby_setup";
/// Data directory and null-hypothesis toggles.
pub const DATA_SETTINGS: &str = "data_settings";
/// Raw physical parameters of the injected signal.
pub const INJECTION_PARAMETERS: &str = "base_waveform_injection_parameters";
/// Static waveform arguments.
pub const WAVEFORM_ARGUMENTS: &str = "waveform_arguments";
/// Prior file and parameters fixed to their injected values.
pub const PRIOR_SETTINGS: &str = "prior_settings";
/// Integer-valued sampler keyword settings.
pub const SAMPLER_KWARGS: &str = "sampler_kwargs";
/// Optional amplification grid settings.
pub const LENS_SETTINGS: &str = "lens_settings";

/// Pair of registry identifiers naming a waveform model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNames {
    /// Waveform generator class identifier.
    pub generator_class: String,
    /// Frequency-domain source model identifier.
    pub source_model: String,
}

/// Contents of the `bilby_setup` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BilbySetup {
    /// Run label; also names the result directory.
    pub label: String,
    /// Root output directory.
    pub outdir: PathBuf,
    /// Segment duration in seconds.
    pub duration: f64,
    /// Sampling frequency in Hz.
    pub sampling_frequency: f64,
    /// Model used for injection and the lensed hypothesis.
    pub lensed_model: ModelNames,
    /// Ordered detector names.
    pub detectors: Vec<String>,
    /// Sampler identifier.
    pub sampler: String,
    /// Whether corner-plot data is written next to each result.
    pub plot_corner: bool,
    /// Master seed for noise and sampling.
    pub seed: u64,
}

impl BilbySetup {
    /// Reads the section from `config`.
    pub fn from_config(config: &RunConfiguration) -> Result<Self, LensError> {
        let section = config.section(BILBY_SETUP)?;
        let duration = section.get_float("duration")?;
        let sampling_frequency = section.get_float("sampling_frequency")?;
        for (key, value) in [("duration", duration), ("sampling_frequency", sampling_frequency)] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(LensError::ValueConversion(
                    ErrorInfo::new("non-positive-setting", "setting must be positive and finite")
                        .with_context("section", BILBY_SETUP)
                        .with_context("key", key)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        let seed = match section.opt_int("seed")? {
            None => DEFAULT_MASTER_SEED,
            Some(seed) => u64::try_from(seed).map_err(|_| {
                LensError::ValueConversion(
                    ErrorInfo::new("negative-seed", "seed must be non-negative")
                        .with_context("section", BILBY_SETUP)
                        .with_context("key", "seed")
                        .with_context("value", seed.to_string()),
                )
            })?,
        };
        Ok(Self {
            label: section.get_str("label")?,
            outdir: PathBuf::from(section.get_str("outdir")?),
            duration,
            sampling_frequency,
            lensed_model: ModelNames {
                generator_class: section.get_str("lensed_waveform_generator_class")?,
                source_model: section.get_str("lensed_frequency_domain_source_model")?,
            },
            detectors: section.get_list("detectors")?,
            sampler: section.get_str("sampler")?,
            plot_corner: section.get_bool("plot_corner")?,
            seed,
        })
    }
}

/// Contents of the `data_settings` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Subdirectory of `outdir` holding amplification data.
    pub data_subdir: String,
    /// Model for the null hypothesis, present only when the unlensed run is enabled.
    pub unlensed_model: Option<ModelNames>,
}

impl DataSettings {
    /// Reads the section from `config`.
    pub fn from_config(config: &RunConfiguration) -> Result<Self, LensError> {
        let section = config.section(DATA_SETTINGS)?;
        let unlensed_model = if section.get_bool("create_unlensed_prep_run")? {
            Some(ModelNames {
                generator_class: section.get_str("unlensed_waveform_generator_class")?,
                source_model: section.get_str("unlensed_frequency_domain_source_model")?,
            })
        } else {
            None
        };
        Ok(Self {
            data_subdir: section.get_str("data_subdir")?,
            unlensed_model,
        })
    }

    /// Whether the null-hypothesis run is enabled.
    pub fn create_unlensed_prep_run(&self) -> bool {
        self.unlensed_model.is_some()
    }
}

/// Contents of the `prior_settings` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorSettings {
    /// Prior file location.
    pub prior_file: PathBuf,
    /// Parameters whose priors are replaced by their injected values.
    pub parameters_to_fix: Vec<String>,
}

impl PriorSettings {
    /// Reads the section from `config`.
    pub fn from_config(config: &RunConfiguration) -> Result<Self, LensError> {
        let section = config.section(PRIOR_SETTINGS)?;
        let parameters_to_fix = match section.raw("parameters_to_fix") {
            Some(raw) => value::as_list(PRIOR_SETTINGS, "parameters_to_fix", raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            prior_file: PathBuf::from(section.get_str("prior_file")?),
            parameters_to_fix,
        })
    }
}

/// Optional amplification grid settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LensSettings {
    /// User-supplied dimensionless frequency grid, reused as-is.
    pub w_array_file: Option<PathBuf>,
    /// User-supplied impact parameter grid, reused as-is.
    pub y_array_file: Option<PathBuf>,
    /// Lower bound of the generated `w` grid.
    pub min_w: f64,
    /// Upper bound of the generated `w` grid.
    pub max_w: f64,
    /// Number of `w` grid points.
    pub npoints_w: usize,
    /// Lower bound of the generated `y` grid.
    pub min_y: f64,
    /// Upper bound of the generated `y` grid.
    pub max_y: f64,
    /// Number of `y` grid points.
    pub npoints_y: usize,
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            w_array_file: None,
            y_array_file: None,
            min_w: 1e-3,
            max_w: 1e3,
            npoints_w: 200,
            min_y: 0.05,
            max_y: 3.0,
            npoints_y: 60,
        }
    }
}

impl LensSettings {
    /// Reads the optional section, falling back to defaults for absent keys.
    pub fn from_config(config: &RunConfiguration) -> Result<Self, LensError> {
        let mut settings = Self::default();
        if !config.has_section(LENS_SETTINGS) {
            return Ok(settings);
        }
        let section = config.section(LENS_SETTINGS)?;
        settings.w_array_file = section.opt_str("w_array_file")?.map(PathBuf::from);
        settings.y_array_file = section.opt_str("y_array_file")?.map(PathBuf::from);
        if let Some(value) = section.opt_float("min_w")? {
            settings.min_w = value;
        }
        if let Some(value) = section.opt_float("max_w")? {
            settings.max_w = value;
        }
        if let Some(value) = section.opt_float("min_y")? {
            settings.min_y = value;
        }
        if let Some(value) = section.opt_float("max_y")? {
            settings.max_y = value;
        }
        if let Some(value) = section.opt_int("npoints_w")? {
            settings.npoints_w = grid_size("npoints_w", value)?;
        }
        if let Some(value) = section.opt_int("npoints_y")? {
            settings.npoints_y = grid_size("npoints_y", value)?;
        }
        Ok(settings)
    }
}

fn grid_size(key: &str, value: i64) -> Result<usize, LensError> {
    usize::try_from(value)
        .ok()
        .filter(|size| *size >= 2)
        .ok_or_else(|| {
            LensError::ValueConversion(
                ErrorInfo::new("invalid-grid-size", "grids need at least two points")
                    .with_context("section", LENS_SETTINGS)
                    .with_context("key", key)
                    .with_context("value", value.to_string()),
            )
        })
}

/// Reads `sampler_kwargs`, coercing every value to an integer.
///
/// An absent section yields an empty map.
pub fn sampler_kwargs(config: &RunConfiguration) -> Result<IndexMap<String, i64>, LensError> {
    if !config.has_section(SAMPLER_KWARGS) {
        return Ok(IndexMap::new());
    }
    let section = config.section(SAMPLER_KWARGS)?;
    section
        .entries()
        .map(|(key, raw)| Ok((key.to_string(), value::as_int(SAMPLER_KWARGS, key, raw)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(text: &str) -> RunConfiguration {
        RunConfiguration::parse(text).unwrap()
    }

    const SETUP: &str = r#"
[bilby_setup]
label = "lensing"
outdir = "out"
duration = 4
sampling_frequency = 1024
lensed_waveform_generator_class = "lensed"
lensed_frequency_domain_source_model = "lensed_bbh_model"
detectors = "H1,L1"
sampler = "nested"
plot_corner = false
"#;

    #[test]
    fn bilby_setup_defaults_seed() {
        let setup = BilbySetup::from_config(&config(SETUP)).unwrap();
        assert_eq!(setup.label, "lensing");
        assert_eq!(setup.detectors, vec!["H1", "L1"]);
        assert_eq!(setup.seed, DEFAULT_MASTER_SEED);
        assert_eq!(setup.lensed_model.source_model, "lensed_bbh_model");
    }

    #[test]
    fn negative_duration_is_rejected() {
        let text = SETUP.replace("duration = 4", "duration = -4");
        let err = BilbySetup::from_config(&config(&text)).unwrap_err();
        assert_eq!(err.info().code, "non-positive-setting");
    }

    #[test]
    fn unlensed_model_required_only_when_enabled() {
        let disabled = config("[data_settings]\ndata_subdir = \"data\"\ncreate_unlensed_prep_run = false\n");
        assert!(!DataSettings::from_config(&disabled).unwrap().create_unlensed_prep_run());

        let enabled = config("[data_settings]\ndata_subdir = \"data\"\ncreate_unlensed_prep_run = true\n");
        let err = DataSettings::from_config(&enabled).unwrap_err();
        assert_eq!(err.info().context["key"], "unlensed_waveform_generator_class");
    }

    #[test]
    fn sampler_kwargs_are_integers() {
        let kwargs = sampler_kwargs(&config("[sampler_kwargs]\nnlive = \"50\"\nwalks = 10\n")).unwrap();
        assert_eq!(kwargs["nlive"], 50);
        assert_eq!(kwargs["walks"], 10);
        let err = sampler_kwargs(&config("[sampler_kwargs]\nnlive = \"many\"\n")).unwrap_err();
        assert!(matches!(err, LensError::ValueConversion(_)));
    }

    #[test]
    fn lens_settings_fall_back_to_defaults() {
        let settings = LensSettings::from_config(&config("[lens_settings]\nnpoints_y = 10\n")).unwrap();
        assert_eq!(settings.npoints_y, 10);
        assert_eq!(settings.npoints_w, LensSettings::default().npoints_w);
        let err = LensSettings::from_config(&config("[lens_settings]\nnpoints_w = 1\n")).unwrap_err();
        assert_eq!(err.info().code, "invalid-grid-size");
    }
}
