#![deny(missing_docs)]

//! Comparative inference of lensed and unlensed hypotheses for the glens pipeline.
//!
//! A run injects the lensed model once into a simulated network and samples
//! each enabled hypothesis against that frozen strain with the built-in nested
//! sampler. Results are persisted per hypothesis and never combined here.

/// Corner-plot histogram data.
pub mod corner;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Likelihood trait and the Gaussian-noise network likelihood.
pub mod likelihood;
/// Nested sampling engine.
pub mod nested;
/// Configuration-driven end-to-end pipeline.
pub mod pipeline;
/// Persisted per-hypothesis results.
pub mod result;
/// Sampler run and hypothesis orchestration.
pub mod runner;
/// Sampler selection and tuning.
pub mod settings;

pub use corner::{corner_data, CornerData};
pub use likelihood::{GravitationalWaveLikelihood, Likelihood};
pub use nested::{sample, NestedRun, WeightedSample};
pub use pipeline::run_pipeline;
pub use result::InferenceResult;
pub use runner::{orchestrate, run, HypothesisOutcome, UNLENSED_SUFFIX};
pub use settings::{NestedSettings, SamplerName, SamplerSettings};
