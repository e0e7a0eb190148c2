//! Closed registry mapping configuration identifiers to waveform components.

use std::fmt::{self, Display};
use std::str::FromStr;

use glens_core::errors::{ErrorInfo, LensError};
use serde::{Deserialize, Serialize};

use crate::conversion::ParameterConversion;
use crate::source::SourceModel;

/// Waveform generator classes known to the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorClass {
    /// Plain frequency-domain generator.
    Default,
    /// Generator that loads amplification tables at construction.
    Lensed,
}

impl GeneratorClass {
    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorClass::Default => "default",
            GeneratorClass::Lensed => "lensed",
        }
    }
}

impl FromStr for GeneratorClass {
    type Err = LensError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "default" | "bilby.gw.waveform_generator.WaveformGenerator" => {
                Ok(GeneratorClass::Default)
            }
            "lensed" | "gravelamps.lensing.waveform_generator.LensedWaveformGenerator" => {
                Ok(GeneratorClass::Lensed)
            }
            other => Err(unknown("generator-class", other)),
        }
    }
}

impl Display for GeneratorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SourceModel {
    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceModel::LalBinaryBlackHole => "lal_binary_black_hole",
            SourceModel::AmplifiedLalBinaryBlackHole => "amplified_lal_binary_black_hole",
        }
    }

    /// Conversion applied to parameters before this model is evaluated.
    pub fn conversion(&self) -> ParameterConversion {
        match self {
            SourceModel::LalBinaryBlackHole => ParameterConversion::BinaryBlackHole,
            SourceModel::AmplifiedLalBinaryBlackHole => ParameterConversion::LensedBinaryBlackHole,
        }
    }
}

impl FromStr for SourceModel {
    type Err = LensError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "lal_binary_black_hole" | "bilby.gw.source.lal_binary_black_hole" => {
                Ok(SourceModel::LalBinaryBlackHole)
            }
            "amplified_lal_binary_black_hole"
            | "lensed_bbh_model"
            | "gravelamps.lensing.source.lensed_bbh_model" => {
                Ok(SourceModel::AmplifiedLalBinaryBlackHole)
            }
            other => Err(unknown("source-model", other)),
        }
    }
}

impl Display for SourceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving a `(generator class, source model)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModel {
    /// Generator class to construct.
    pub generator: GeneratorClass,
    /// Source model evaluated by the generator.
    pub source: SourceModel,
    /// Conversion paired with the source model.
    pub conversion: ParameterConversion,
}

/// Resolves configuration identifiers against the registry.
///
/// Fails with [`LensError::UnknownModel`] naming the offending identifier, or
/// when a lensed source model is paired with a generator that carries no
/// amplification tables.
pub fn resolve(generator_name: &str, source_name: &str) -> Result<ResolvedModel, LensError> {
    let generator: GeneratorClass = generator_name.parse()?;
    let source: SourceModel = source_name.parse()?;
    if source.is_lensed() && generator != GeneratorClass::Lensed {
        return Err(LensError::UnknownModel(
            ErrorInfo::new(
                "incompatible-model",
                "lensed source models need the lensed generator class",
            )
            .with_context("name", source_name)
            .with_context("generator", generator_name),
        ));
    }
    Ok(ResolvedModel {
        generator,
        source,
        conversion: source.conversion(),
    })
}

fn unknown(kind: &str, name: &str) -> LensError {
    LensError::UnknownModel(
        ErrorInfo::new(format!("unknown-{kind}"), format!("unrecognised {kind} identifier"))
            .with_context("name", name),
    )
}
