//! End-to-end run: amplification data, injection, priors and both hypotheses.

use std::fs;
use std::sync::Arc;

use glens_config::{injection, BilbySetup, DataSettings, PriorSettings, RunConfiguration};
use glens_core::errors::LensError;
use glens_core::params::require;
use glens_detector::{InterferometerNetwork, PRE_MERGER_BUFFER};
use glens_prior::{fix, load};
use glens_waveform::{build, resolve, AmplificationDataProvider, DeploymentMode, WaveformArguments};

use crate::runner::{orchestrate, HypothesisOutcome};
use crate::settings::SamplerSettings;

/// Executes the configured run.
///
/// Noise is simulated on a segment starting [`PRE_MERGER_BUFFER`] seconds
/// before `geocent_time`, the lensed model is injected once, and the enabled
/// hypotheses are sampled against the frozen strain.
pub fn run_pipeline(
    config: &RunConfiguration,
    provider: &dyn AmplificationDataProvider,
) -> Result<HypothesisOutcome, LensError> {
    let setup = BilbySetup::from_config(config)?;
    let data = DataSettings::from_config(config)?;
    let data_dir = setup.outdir.join(&data.data_subdir);
    fs::create_dir_all(&data_dir)
        .map_err(|err| LensError::output("outdir-create", &data_dir, err))?;
    tracing::info!(
        label = %setup.label,
        outdir = %setup.outdir.display(),
        unlensed = data.create_unlensed_prep_run(),
        "starting lensing run"
    );

    let injection_parameters = injection::build(config)?;
    let files = provider.provide(config, DeploymentMode::Local)?;
    let arguments = Arc::new(WaveformArguments::from_config(config, files)?);

    let resolved = resolve(
        &setup.lensed_model.generator_class,
        &setup.lensed_model.source_model,
    )?;
    let lensed_generator = build(
        resolved.generator,
        setup.duration,
        setup.sampling_frequency,
        resolved.source,
        resolved.conversion,
        Arc::clone(&arguments),
    )?;

    let mut network = InterferometerNetwork::build_network(&setup.detectors)?;
    network.set_frequency_band(
        arguments.minimum_frequency,
        arguments.maximum_frequency_for(setup.sampling_frequency),
    );
    let start_time = require(&injection_parameters, "geocent_time")? - PRE_MERGER_BUFFER;
    network.simulate_noise(setup.sampling_frequency, setup.duration, start_time, setup.seed)?;
    network.inject(&lensed_generator, &injection_parameters)?;

    let prior_settings = PriorSettings::from_config(config)?;
    let priors = fix(
        &load(&prior_settings.prior_file)?,
        &prior_settings.parameters_to_fix,
        &injection_parameters,
    )?;
    let settings = SamplerSettings::from_config(config)?;

    orchestrate(
        config,
        &network,
        &lensed_generator,
        &priors,
        &injection_parameters,
        &settings,
    )
}
