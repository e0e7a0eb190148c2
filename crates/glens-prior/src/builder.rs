//! Prior derivation for the two hypotheses.

use std::path::Path;

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::{ParameterMap, LENSING_PARAMETERS};

use crate::distribution::Prior;
use crate::set::PriorSet;

/// Reads the prior file at `path`.
pub fn load(path: &Path) -> Result<PriorSet, LensError> {
    let priors = PriorSet::load(path)?;
    tracing::info!(
        path = %path.display(),
        parameters = priors.len(),
        sampled = priors.sampled_names().len(),
        "loaded priors"
    );
    Ok(priors)
}

/// Returns a copy of `priors` with every name in `names` fixed to its injected value.
///
/// Names absent from the prior set are added as fixed entries. A name missing
/// from `injection` cannot be fixed and fails with
/// [`LensError::UnknownParameter`].
pub fn fix<S: AsRef<str>>(
    priors: &PriorSet,
    names: &[S],
    injection: &ParameterMap,
) -> Result<PriorSet, LensError> {
    let mut fixed = priors.clone();
    for name in names {
        let name = name.as_ref();
        let value = injection.get(name).copied().ok_or_else(|| {
            LensError::UnknownParameter(
                ErrorInfo::new("fix-unknown-parameter", "parameter has no injected value to fix to")
                    .with_context("name", name)
                    .with_context("in_priors", priors.contains(name).to_string()),
            )
        })?;
        fixed.insert(name, Prior::fixed(value));
        tracing::debug!(parameter = name, value, "fixed prior to injected value");
    }
    Ok(fixed)
}

/// Returns the null-hypothesis variant of `priors`: lensing parameters fixed to zero.
pub fn zero_lensing_parameters(priors: &PriorSet) -> PriorSet {
    let mut null = priors.clone();
    for name in LENSING_PARAMETERS {
        null.insert(name, Prior::fixed(0.0));
    }
    null
}

#[cfg(test)]
mod tests {
    use super::*;
    use glens_core::RngHandle;

    fn base() -> PriorSet {
        PriorSet::parse(
            r#"
mass_ratio = { type = "uniform", minimum = 0.2, maximum = 1.0 }
geocent_time = { type = "uniform", minimum = 1126259641.4, maximum = 1126259643.4 }
lens_mass = { type = "log_uniform", minimum = 10.0, maximum = 10000.0 }
impact_parameter = { type = "uniform", minimum = 0.1, maximum = 3.0 }
lens_fractional_distance = 0.5
"#,
        )
        .unwrap()
    }

    fn injection() -> ParameterMap {
        [("geocent_time", 1_126_259_642.413), ("mass_1", 30.0)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn fixed_geocent_time_always_samples_injected_value() {
        let fixed = fix(&base(), &["geocent_time"], &injection()).unwrap();
        let mut rng = RngHandle::from_seed(5);
        for _ in 0..50 {
            assert_eq!(fixed.get("geocent_time").unwrap().sample(&mut rng), 1_126_259_642.413);
            assert_eq!(fixed.sample(&mut rng)["geocent_time"], 1_126_259_642.413);
        }
        assert!(!base().get("geocent_time").unwrap().is_fixed());
    }

    #[test]
    fn fixing_adds_parameters_only_present_in_the_injection() {
        let fixed = fix(&base(), &["mass_1"], &injection()).unwrap();
        assert_eq!(fixed.get("mass_1"), Some(&Prior::fixed(30.0)));
    }

    #[test]
    fn unknown_names_fail() {
        let err = fix(&base(), &["spin_1"], &injection()).unwrap_err();
        assert!(matches!(err, LensError::UnknownParameter(_)));
        assert_eq!(err.info().context["name"], "spin_1");
    }

    #[test]
    fn zeroing_leaves_other_keys_and_the_input_untouched() {
        let original = base();
        let snapshot = original.clone();
        let null = zero_lensing_parameters(&original);
        for name in LENSING_PARAMETERS {
            assert_eq!(null.get(name), Some(&Prior::fixed(0.0)));
        }
        assert_eq!(null.get("mass_ratio"), original.get("mass_ratio"));
        assert_eq!(null.get("geocent_time"), original.get("geocent_time"));
        assert_eq!(original, snapshot);
    }

    #[test]
    fn zeroing_adds_missing_lensing_parameters() {
        let null = zero_lensing_parameters(&PriorSet::new());
        assert_eq!(null.len(), 3);
        assert!(null.sampled_names().is_empty());
    }
}
