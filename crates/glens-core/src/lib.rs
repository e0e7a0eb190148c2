#![deny(missing_docs)]
#![doc = "Core error taxonomy, deterministic seeding and parameter relations shared by the glens crates."]

pub mod constants;
pub mod conversion;
pub mod errors;
pub mod params;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, LensError};
pub use params::{require, ParameterMap, LENSING_PARAMETERS};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, label_substream, RngHandle, DEFAULT_MASTER_SEED};
