//! Run configuration ingest for the glens pipeline.
//!
//! The configuration is a sectioned key/value file (TOML syntax). Values are
//! coerced on access by the typed getters, so `duration = "4"` and
//! `duration = 4` read the same.

mod configuration;
pub mod injection;
pub mod sections;
pub mod value;

pub use configuration::{RunConfiguration, Section};
pub use sections::{
    sampler_kwargs, BilbySetup, DataSettings, LensSettings, ModelNames, PriorSettings,
};
