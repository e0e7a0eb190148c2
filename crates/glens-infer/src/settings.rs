use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use glens_config::{sampler_kwargs, BilbySetup, RunConfiguration};
use glens_core::errors::{ErrorInfo, LensError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sampling engines known to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerName {
    /// Built-in nested sampler with random-walk replacement.
    Nested,
}

impl SamplerName {
    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplerName::Nested => "nested",
        }
    }
}

impl FromStr for SamplerName {
    type Err = LensError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nested" | "dynesty" | "nestle" => Ok(SamplerName::Nested),
            other => Err(LensError::Sampler(
                ErrorInfo::new("unknown-sampler", "sampler is not available")
                    .with_context("name", other)
                    .with_hint("use `nested` (aliases: dynesty, nestle)"),
            )),
        }
    }
}

impl Display for SamplerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning of the nested sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedSettings {
    /// Number of live points.
    #[serde(default = "default_nlive")]
    pub nlive: usize,
    /// Random-walk steps per replacement.
    #[serde(default = "default_walks")]
    pub walks: usize,
    /// Iteration cap.
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,
    /// Stop once the remaining evidence is below this log ratio.
    #[serde(default = "default_dlogz")]
    pub dlogz: f64,
    /// Explicit sampler seed; derived from the master seed and label otherwise.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_nlive() -> usize {
    250
}

fn default_walks() -> usize {
    25
}

fn default_maxiter() -> usize {
    50_000
}

fn default_dlogz() -> f64 {
    0.1
}

impl Default for NestedSettings {
    fn default() -> Self {
        Self {
            nlive: default_nlive(),
            walks: default_walks(),
            maxiter: default_maxiter(),
            dlogz: default_dlogz(),
            seed: None,
        }
    }
}

impl NestedSettings {
    /// Applies integer keyword settings; unknown keys are logged and ignored.
    pub fn from_kwargs(kwargs: &IndexMap<String, i64>) -> Result<Self, LensError> {
        let mut settings = Self::default();
        for (key, &value) in kwargs {
            match key.as_str() {
                "nlive" | "npoints" => settings.nlive = positive(key, value)?,
                "walks" => settings.walks = positive(key, value)?,
                "maxiter" => settings.maxiter = positive(key, value)?,
                "seed" => {
                    settings.seed = Some(u64::try_from(value).map_err(|_| invalid(key, value))?)
                }
                _ => tracing::warn!(key = %key, value, "ignoring unsupported sampler keyword"),
            }
        }
        Ok(settings)
    }
}

fn invalid(key: &str, value: i64) -> LensError {
    LensError::Sampler(
        ErrorInfo::new("invalid-kwarg", "sampler keyword must be a positive integer")
            .with_context("key", key)
            .with_context("value", value.to_string()),
    )
}

fn positive(key: &str, value: i64) -> Result<usize, LensError> {
    usize::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| invalid(key, value))
}

/// Per-run sampler settings, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Base label; the unlensed run appends `_unlensed`.
    pub label: String,
    /// Root output directory.
    pub outdir: PathBuf,
    /// Engine.
    pub sampler: SamplerName,
    /// Whether corner plot data is written.
    pub plot_corner: bool,
    /// Raw integer keyword settings as configured.
    pub kwargs: IndexMap<String, i64>,
    /// Engine tuning derived from `kwargs`.
    pub nested: NestedSettings,
    /// Master seed of the run.
    pub master_seed: u64,
    /// Configuration file the run was read from.
    pub config_path: Option<PathBuf>,
}

impl SamplerSettings {
    /// Reads `bilby_setup` and `sampler_kwargs`.
    pub fn from_config(config: &RunConfiguration) -> Result<Self, LensError> {
        let setup = BilbySetup::from_config(config)?;
        let kwargs = sampler_kwargs(config)?;
        Ok(Self {
            label: setup.label,
            outdir: setup.outdir,
            sampler: setup.sampler.parse()?,
            plot_corner: setup.plot_corner,
            nested: NestedSettings::from_kwargs(&kwargs)?,
            kwargs,
            master_seed: setup.seed,
            config_path: config.source().map(|path| path.to_path_buf()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_aliases_map_to_builtin_engine() {
        for name in ["nested", "Dynesty", "nestle"] {
            assert_eq!(name.parse::<SamplerName>().unwrap(), SamplerName::Nested);
        }
        let err = "emcee".parse::<SamplerName>().unwrap_err();
        assert!(matches!(err, LensError::Sampler(_)));
        assert_eq!(err.info().context["name"], "emcee");
    }

    #[test]
    fn kwargs_override_defaults() {
        let kwargs: IndexMap<String, i64> = [("nlive".to_string(), 64), ("seed".to_string(), 9)]
            .into_iter()
            .collect();
        let settings = NestedSettings::from_kwargs(&kwargs).unwrap();
        assert_eq!(settings.nlive, 64);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.walks, default_walks());
    }

    #[test]
    fn zero_live_points_are_rejected() {
        let kwargs: IndexMap<String, i64> = [("nlive".to_string(), 0)].into_iter().collect();
        let err = NestedSettings::from_kwargs(&kwargs).unwrap_err();
        assert_eq!(err.info().code, "invalid-kwarg");
    }

    #[test]
    fn unknown_kwargs_are_tolerated() {
        let kwargs: IndexMap<String, i64> = [("npool".to_string(), 4)].into_iter().collect();
        assert_eq!(NestedSettings::from_kwargs(&kwargs).unwrap(), NestedSettings::default());
    }
}
