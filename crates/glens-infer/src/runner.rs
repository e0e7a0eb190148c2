use std::sync::Arc;

use chrono::Utc;
use glens_config::{BilbySetup, DataSettings, RunConfiguration};
use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use glens_core::provenance::RunProvenance;
use glens_detector::InterferometerNetwork;
use glens_prior::{zero_lensing_parameters, PriorSet};
use glens_waveform::{build, resolve, WaveformGenerator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::determinism::sampler_seed;
use crate::likelihood::{GravitationalWaveLikelihood, Likelihood};
use crate::nested;
use crate::result::{tool_versions, InferenceResult, RESULT_SCHEMA};
use crate::settings::{SamplerName, SamplerSettings};

/// Label suffix of the null-hypothesis run.
pub const UNLENSED_SUFFIX: &str = "_unlensed";

/// Results of both hypotheses; never combined here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisOutcome {
    /// Lensed hypothesis.
    pub lensed: InferenceResult,
    /// Unlensed hypothesis, when enabled.
    pub unlensed: Option<InferenceResult>,
}

/// Samples `likelihood` over `priors` once and persists the result under `outdir/label`.
///
/// Engine failures surface as [`LensError::Sampler`] and are not retried.
pub fn run<L: Likelihood>(
    likelihood: &L,
    priors: &PriorSet,
    settings: &SamplerSettings,
    label: &str,
    injection: &ParameterMap,
) -> Result<InferenceResult, LensError> {
    let span = tracing::info_span!("hypothesis", label = %label);
    let _guard = span.enter();

    let seed = settings
        .nested
        .seed
        .unwrap_or_else(|| sampler_seed(settings.master_seed, label));
    tracing::info!(
        sampler = %settings.sampler,
        nlive = settings.nested.nlive,
        walks = settings.nested.walks,
        seed,
        search_parameters = ?priors.sampled_names(),
        fixed = ?priors.fixed_values(),
        "starting sampler"
    );
    let strain_digest = likelihood.data_digest()?;
    let run = match settings.sampler {
        SamplerName::Nested => nested::sample(likelihood, priors, &settings.nested, seed)?,
    };

    let mut posterior: IndexMap<String, Vec<f64>> = IndexMap::new();
    for draw in &run.posterior {
        for (name, value) in draw {
            posterior.entry(name.clone()).or_default().push(*value);
        }
    }
    let log_noise_evidence = likelihood.noise_log_likelihood();
    let result = InferenceResult {
        schema: RESULT_SCHEMA,
        label: label.to_string(),
        sampler: settings.sampler.to_string(),
        log_evidence: run.log_evidence,
        log_evidence_err: run.log_evidence_err,
        log_noise_evidence,
        log_bayes_factor: run.log_evidence - log_noise_evidence,
        information: run.information,
        iterations: run.iterations,
        likelihood_evaluations: run.likelihood_evaluations,
        search_parameters: run.search_parameters,
        posterior,
        injection_parameters: injection.clone(),
        strain_digest: strain_digest.clone(),
        provenance: RunProvenance {
            config_path: settings
                .config_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            strain_digest: strain_digest.unwrap_or_default(),
            seed,
            created_at: Utc::now().to_rfc3339(),
            tool_versions: tool_versions(),
        },
    };

    let dir = settings.outdir.join(label);
    result.write(&dir, settings.plot_corner)?;
    tracing::info!(
        log_evidence = result.log_evidence,
        log_evidence_err = result.log_evidence_err,
        log_bayes_factor = result.log_bayes_factor,
        iterations = result.iterations,
        likelihood_evaluations = result.likelihood_evaluations,
        posterior_draws = result.posterior_len(),
        dir = %dir.display(),
        "sampler finished"
    );
    Ok(result)
}

/// Runs the enabled hypotheses against the injected network.
///
/// The unlensed hypothesis, when enabled, runs first with the lensing
/// parameters fixed to zero in a copy of `base_priors`; the lensed hypothesis
/// follows with `base_priors` unchanged. The strain digest is checked against
/// the post-injection digest before each run.
pub fn orchestrate(
    config: &RunConfiguration,
    network: &InterferometerNetwork,
    lensed_generator: &WaveformGenerator,
    base_priors: &PriorSet,
    injection: &ParameterMap,
    settings: &SamplerSettings,
) -> Result<HypothesisOutcome, LensError> {
    if !network.is_injected() {
        return Err(LensError::Injection(
            ErrorInfo::new("not-injected", "hypothesis runs need an injected network")
                .with_hint("call inject before orchestrating the runs"),
        ));
    }
    let frozen = network.strain_digest()?;
    let data = DataSettings::from_config(config)?;

    let unlensed = match &data.unlensed_model {
        Some(names) => {
            let setup = BilbySetup::from_config(config)?;
            let resolved = resolve(&names.generator_class, &names.source_model)?;
            let generator = build(
                resolved.generator,
                setup.duration,
                setup.sampling_frequency,
                resolved.source,
                resolved.conversion,
                Arc::clone(lensed_generator.arguments()),
            )?;
            let likelihood = GravitationalWaveLikelihood::new(network, &generator)?;
            let null_priors = zero_lensing_parameters(base_priors);
            let label = format!("{}{}", settings.label, UNLENSED_SUFFIX);
            check_frozen(network, &frozen, &label)?;
            Some(run(&likelihood, &null_priors, settings, &label, injection)?)
        }
        None => None,
    };

    let likelihood = GravitationalWaveLikelihood::new(network, lensed_generator)?;
    check_frozen(network, &frozen, &settings.label)?;
    let lensed = run(&likelihood, base_priors, settings, &settings.label, injection)?;

    Ok(HypothesisOutcome { lensed, unlensed })
}

fn check_frozen(network: &InterferometerNetwork, frozen: &str, label: &str) -> Result<(), LensError> {
    let current = network.strain_digest()?;
    if current != frozen {
        return Err(LensError::Injection(
            ErrorInfo::new("strain-mutated", "strain data changed after injection")
                .with_context("label", label)
                .with_context("expected", frozen)
                .with_context("found", current),
        ));
    }
    tracing::debug!(label, digest = %current, "strain digest verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::NestedSettings;
    use glens_prior::Prior;
    use tempfile::tempdir;

    struct Bowl;

    impl Likelihood for Bowl {
        fn log_likelihood(&self, params: &ParameterMap) -> Result<f64, LensError> {
            Ok(-0.5 * (params["x"] - 1.0).powi(2) / 0.04)
        }

        fn noise_log_likelihood(&self) -> f64 {
            -3.0
        }
    }

    fn settings(outdir: &std::path::Path) -> SamplerSettings {
        SamplerSettings {
            label: "bowl".to_string(),
            outdir: outdir.to_path_buf(),
            sampler: SamplerName::Nested,
            plot_corner: false,
            kwargs: IndexMap::new(),
            nested: NestedSettings {
                nlive: 40,
                walks: 10,
                ..NestedSettings::default()
            },
            master_seed: 21,
            config_path: None,
        }
    }

    fn priors() -> PriorSet {
        [
            ("x".to_string(), Prior::Uniform { minimum: -2.0, maximum: 4.0 }),
            ("lens_mass".to_string(), Prior::fixed(0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn run_persists_under_its_label() {
        let dir = tempdir().unwrap();
        let settings = settings(dir.path());
        let result = run(&Bowl, &priors(), &settings, "bowl", &ParameterMap::new()).unwrap();
        assert_eq!(result.log_bayes_factor, result.log_evidence + 3.0);
        assert_eq!(result.strain_digest, None);
        assert_eq!(result.provenance.seed, sampler_seed(21, "bowl"));
        assert_eq!(
            result.posterior.keys().collect::<Vec<_>>(),
            vec!["x", "lens_mass"]
        );
        let loaded = InferenceResult::load(&dir.path().join("bowl")).unwrap();
        assert_eq!(loaded, result);
    }

    #[test]
    fn explicit_seed_overrides_derivation() {
        let dir = tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.nested.seed = Some(5);
        let result = run(&Bowl, &priors(), &settings, "bowl", &ParameterMap::new()).unwrap();
        assert_eq!(result.provenance.seed, 5);
    }
}
