use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use glens_config::{BilbySetup, DataSettings, RunConfiguration};
use glens_infer::{run_pipeline, InferenceResult};
use glens_waveform::LocalAmplificationProvider;

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "glens-sim",
    about = "Inject a lensed binary black hole signal and compare lensed and unlensed hypotheses"
)]
struct Cli {
    /// TOML configuration describing the run.
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = RunConfiguration::load(&cli.config)?;
    let setup = BilbySetup::from_config(&config)?;
    let data = DataSettings::from_config(&config)?;
    fs::create_dir_all(setup.outdir.join(&data.data_subdir))?;

    let dispatch = logging::build_dispatch(&setup.outdir.join(format!("{}.log", setup.label)))?;
    let outcome = tracing::dispatcher::with_default(&dispatch, || {
        tracing::info!(config = %cli.config.display(), "glens-sim starting");
        run_pipeline(&config, &LocalAmplificationProvider)
    })?;

    if let Some(unlensed) = &outcome.unlensed {
        print_summary(unlensed);
    }
    print_summary(&outcome.lensed);
    Ok(())
}

fn print_summary(result: &InferenceResult) {
    println!(
        "{}: ln Z = {:.3} +/- {:.3} (ln BF vs noise = {:.3}, {} posterior draws)",
        result.label,
        result.log_evidence,
        result.log_evidence_err,
        result.log_bayes_factor,
        result.posterior_len()
    );
}
