//! Waveform model factory for the glens pipeline.
//!
//! Configuration identifiers resolve through a closed registry into a generator
//! class, a frequency-domain source model and its parameter conversion. The
//! lensed and unlensed generators of a run share one set of waveform arguments,
//! including the amplification file references produced by an
//! [`AmplificationDataProvider`].

pub mod amplification;
pub mod arguments;
pub mod conversion;
pub mod generator;
pub mod registry;
pub mod source;

pub use amplification::{
    point_lens_geometric_optics, AmplificationDataProvider, AmplificationFiles,
    AmplificationTable, DeploymentMode, LocalAmplificationProvider,
};
pub use arguments::WaveformArguments;
pub use conversion::ParameterConversion;
pub use generator::{build, frequency_array, WaveformGenerator};
pub use registry::{resolve, GeneratorClass, ResolvedModel};
pub use source::{Band, Polarizations, SourceModel};
