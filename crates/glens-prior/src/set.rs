use std::fs;
use std::path::Path;

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distribution::Prior;

/// Ordered mapping of parameter name to prior.
///
/// Sets have value semantics: deriving a variant for another hypothesis
/// produces a new set and leaves this one as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorSet {
    priors: IndexMap<String, Prior>,
}

impl PriorSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a prior file.
    ///
    /// Each top-level key names a parameter. Its value is either a table with
    /// a `type` tag and the distribution fields, or a bare number meaning the
    /// parameter is fixed.
    pub fn load(path: &Path) -> Result<Self, LensError> {
        if !path.is_file() {
            return Err(LensError::PriorFile(
                ErrorInfo::new("prior-file-missing", "prior file does not exist")
                    .with_context("path", path.display().to_string()),
            ));
        }
        let text = fs::read_to_string(path).map_err(|err| {
            LensError::PriorFile(
                ErrorInfo::new("prior-file-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::parse(&text).map_err(|err| match err {
            LensError::PriorFile(info) => {
                LensError::PriorFile(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Parses prior file contents.
    pub fn parse(text: &str) -> Result<Self, LensError> {
        let table: toml::Table = text.parse().map_err(|err: toml::de::Error| {
            LensError::PriorFile(ErrorInfo::new("prior-file-parse", err.to_string()))
        })?;
        let mut set = Self::new();
        for (name, value) in table {
            let prior = match value {
                toml::Value::Float(peak) => Prior::fixed(peak),
                toml::Value::Integer(peak) => Prior::fixed(peak as f64),
                table @ toml::Value::Table(_) => table.try_into::<Prior>().map_err(|err| {
                    LensError::PriorFile(
                        ErrorInfo::new("prior-entry", err.to_string())
                            .with_context("parameter", name.as_str()),
                    )
                })?,
                other => {
                    return Err(LensError::PriorFile(
                        ErrorInfo::new(
                            "prior-entry",
                            "entry must be a number or a table with a `type` tag",
                        )
                        .with_context("parameter", name.as_str())
                        .with_context("value", other.to_string()),
                    ))
                }
            };
            prior.validate().map_err(|message| {
                LensError::PriorFile(
                    ErrorInfo::new("prior-bounds", message)
                        .with_context("parameter", name.as_str())
                        .with_context("type", prior.kind()),
                )
            })?;
            set.priors.insert(name, prior);
        }
        Ok(set)
    }

    /// Prior for `name`.
    pub fn get(&self, name: &str) -> Option<&Prior> {
        self.priors.get(name)
    }

    /// Whether `name` has a prior.
    pub fn contains(&self, name: &str) -> bool {
        self.priors.contains_key(name)
    }

    /// Inserts or replaces the prior for `name`.
    pub fn insert(&mut self, name: impl Into<String>, prior: Prior) -> Option<Prior> {
        self.priors.insert(name.into(), prior)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.priors.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }

    /// Iterates parameters in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prior)> {
        self.priors.iter().map(|(name, prior)| (name.as_str(), prior))
    }

    /// Parameters explored by a sampler, in file order.
    pub fn sampled_names(&self) -> Vec<String> {
        self.priors
            .iter()
            .filter(|(_, prior)| !prior.is_fixed())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Parameters pinned to a single value.
    pub fn fixed_values(&self) -> ParameterMap {
        self.priors
            .iter()
            .filter_map(|(name, prior)| match prior {
                Prior::DeltaFunction { peak } => Some((name.clone(), *peak)),
                _ => None,
            })
            .collect()
    }

    /// Maps a point of the unit hypercube to a full parameter map.
    ///
    /// `unit` holds one coordinate per entry of [`sampled_names`]; fixed
    /// parameters take their peak value.
    ///
    /// [`sampled_names`]: PriorSet::sampled_names
    pub fn rescale(&self, unit: &[f64]) -> ParameterMap {
        let mut coordinates = unit.iter();
        self.priors
            .iter()
            .map(|(name, prior)| {
                let value = if prior.is_fixed() {
                    prior.rescale(0.0)
                } else {
                    prior.rescale(coordinates.next().copied().unwrap_or(0.5))
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Joint log prior of the parameters present in the set.
    #[cfg(test)]
    pub(crate) fn ln_prob(&self, params: &ParameterMap) -> f64 {
        self.priors
            .iter()
            .map(|(name, prior)| match params.get(name) {
                Some(value) => prior.ln_prob(*value),
                None => f64::NEG_INFINITY,
            })
            .sum()
    }

    /// Draws every parameter.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParameterMap {
        self.priors
            .iter()
            .map(|(name, prior)| (name.clone(), prior.sample(rng)))
            .collect()
    }
}

impl FromIterator<(String, Prior)> for PriorSet {
    fn from_iter<T: IntoIterator<Item = (String, Prior)>>(iter: T) -> Self {
        Self {
            priors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tables_and_bare_numbers_in_order() {
        let set = PriorSet::parse(
            r#"
chirp_mass = { type = "uniform", minimum = 15.0, maximum = 30.0 }
theta_jn = { type = "sine" }
dec = { type = "cosine" }
luminosity_distance = { type = "power_law", alpha = 2, minimum = 100, maximum = 2000 }
phase = 1.3
geocent_time = 1126259642
"#,
        )
        .unwrap();
        let names: Vec<_> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["chirp_mass", "theta_jn", "dec", "luminosity_distance", "phase", "geocent_time"]
        );
        assert_eq!(set.sampled_names().len(), 4);
        assert_eq!(set.fixed_values()["phase"], 1.3);
        assert_eq!(
            set.get("theta_jn"),
            Some(&Prior::Sine { minimum: 0.0, maximum: std::f64::consts::PI })
        );
    }

    #[test]
    fn rescale_fills_fixed_parameters() {
        let set = PriorSet::parse(
            "mass_ratio = { type = \"uniform\", minimum = 0.2, maximum = 1.0 }\nphase = 0.5\n",
        )
        .unwrap();
        let params = set.rescale(&[0.5]);
        assert!((params["mass_ratio"] - 0.6).abs() < 1e-12);
        assert_eq!(params["phase"], 0.5);
        assert!(set.ln_prob(&params).is_finite());
    }

    #[test]
    fn unknown_distribution_type_is_a_prior_file_error() {
        let err = PriorSet::parse("mass_1 = { type = \"triangular\", minimum = 1 }\n").unwrap_err();
        assert!(matches!(err, LensError::PriorFile(_)));
        assert_eq!(err.info().context["parameter"], "mass_1");
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err =
            PriorSet::parse("mass_1 = { type = \"uniform\", minimum = 50, maximum = 10 }\n").unwrap_err();
        assert_eq!(err.info().code, "prior-bounds");
    }

    #[test]
    fn non_numeric_entries_are_rejected() {
        let err = PriorSet::parse("mass_1 = \"heavy\"\n").unwrap_err();
        assert_eq!(err.info().code, "prior-entry");
    }
}
