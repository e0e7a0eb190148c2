use glens_core::conversion::{
    check_component_masses, chirp_mass_and_mass_ratio_to_component_masses,
    component_masses_to_chirp_mass, component_masses_to_mass_ratio,
};
use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::{require, ParameterMap, LENSING_PARAMETERS};
use serde::{Deserialize, Serialize};

/// Parameter conversion applied before a source model is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterConversion {
    /// Fills the component masses and their derived pair.
    BinaryBlackHole,
    /// Binary black hole conversion plus validation of the lensing parameters.
    LensedBinaryBlackHole,
}

impl ParameterConversion {
    /// Identifier used in logs and persisted results.
    pub fn name(&self) -> &'static str {
        match self {
            ParameterConversion::BinaryBlackHole => "convert_to_lal_binary_black_hole_parameters",
            ParameterConversion::LensedBinaryBlackHole => {
                "convert_to_lensed_binary_black_hole_parameters"
            }
        }
    }

    /// Returns a converted copy of `params`.
    ///
    /// `chirp_mass` and `mass_ratio` take precedence over the component masses
    /// when both are present, since they are what the samplers explore.
    pub fn convert(&self, params: &ParameterMap) -> Result<ParameterMap, LensError> {
        let mut converted = params.clone();
        match (params.get("chirp_mass"), params.get("mass_ratio")) {
            (Some(&chirp_mass), Some(&mass_ratio)) => {
                let (mass_1, mass_2) =
                    chirp_mass_and_mass_ratio_to_component_masses(chirp_mass, mass_ratio)?;
                converted.insert("mass_1".to_string(), mass_1);
                converted.insert("mass_2".to_string(), mass_2);
            }
            _ => {
                let mass_1 = require(params, "mass_1")?;
                let mass_2 = require(params, "mass_2")?;
                check_component_masses(mass_1, mass_2)?;
                converted.insert(
                    "chirp_mass".to_string(),
                    component_masses_to_chirp_mass(mass_1, mass_2),
                );
                converted.insert(
                    "mass_ratio".to_string(),
                    component_masses_to_mass_ratio(mass_1, mass_2),
                );
            }
        }
        if let ParameterConversion::LensedBinaryBlackHole = self {
            for name in LENSING_PARAMETERS {
                let value = require(params, name)?;
                if !(value >= 0.0) {
                    return Err(LensError::ValueConversion(
                        ErrorInfo::new("negative-lens-parameter", "lensing parameters must be non-negative")
                            .with_context("parameter", name)
                            .with_context("value", value.to_string()),
                    ));
                }
            }
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> ParameterMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn chirp_mass_pair_fills_component_masses() {
        let converted = ParameterConversion::BinaryBlackHole
            .convert(&params(&[("chirp_mass", 21.237_175_175_898_685), ("mass_ratio", 2.0 / 3.0)]))
            .unwrap();
        assert!((converted["mass_1"] - 30.0).abs() < 1e-9);
        assert!((converted["mass_2"] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn component_masses_fill_derived_pair() {
        let converted = ParameterConversion::BinaryBlackHole
            .convert(&params(&[("mass_1", 20.0), ("mass_2", 30.0)]))
            .unwrap();
        assert!((converted["mass_ratio"] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn lensed_conversion_requires_lens_parameters() {
        let base = params(&[("mass_1", 30.0), ("mass_2", 20.0), ("lens_mass", 100.0)]);
        let err = ParameterConversion::LensedBinaryBlackHole
            .convert(&base)
            .unwrap_err();
        assert_eq!(err.info().context["parameter"], "impact_parameter");
        assert!(ParameterConversion::BinaryBlackHole.convert(&base).is_ok());
    }
}
