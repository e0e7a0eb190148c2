//! Assembly of the true signal parameters used for injection and prior fixing.

use glens_core::conversion::{
    check_component_masses, component_masses_to_chirp_mass, component_masses_to_mass_ratio,
};
use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::{require, ParameterMap};

use crate::configuration::{RunConfiguration, Section};
use crate::sections::INJECTION_PARAMETERS;
use crate::value;

/// Converts every entry of the raw injection section to a float.
pub fn coerce(section: &Section) -> Result<ParameterMap, LensError> {
    section
        .entries()
        .map(|(key, raw)| Ok((key.to_string(), value::as_float(section.name(), key, raw)?)))
        .collect()
}

/// Adds `chirp_mass` and `mass_ratio` computed from `mass_1` and `mass_2`.
///
/// Any value already present under those names is overwritten; the derived pair
/// always reflects the current component masses.
pub fn derive(params: &mut ParameterMap) -> Result<(), LensError> {
    let mass_1 = require(params, "mass_1")?;
    let mass_2 = require(params, "mass_2")?;
    check_component_masses(mass_1, mass_2)?;
    if params.contains_key("chirp_mass") || params.contains_key("mass_ratio") {
        tracing::warn!("replacing configured chirp_mass/mass_ratio with values derived from component masses");
    }
    params.insert(
        "chirp_mass".to_string(),
        component_masses_to_chirp_mass(mass_1, mass_2),
    );
    params.insert(
        "mass_ratio".to_string(),
        component_masses_to_mass_ratio(mass_1, mass_2),
    );
    Ok(())
}

/// Keys the injection section must define.
pub const REQUIRED_KEYS: [&str; 3] = ["mass_1", "mass_2", "geocent_time"];

/// Coerces and derives the injection parameters of `config`.
///
/// `geocent_time` is required because the noise segment is positioned around it.
pub fn build(config: &RunConfiguration) -> Result<ParameterMap, LensError> {
    let section = config.section(INJECTION_PARAMETERS)?;
    if let Some(key) = REQUIRED_KEYS.iter().find(|key| section.raw(key).is_none()) {
        return Err(LensError::MissingKey(
            ErrorInfo::new("missing-key", "required injection parameter is absent")
                .with_context("section", INJECTION_PARAMETERS)
                .with_context("key", *key),
        ));
    }
    let mut params = coerce(section)?;
    derive(&mut params)?;
    tracing::debug!(count = params.len(), "injection parameters derived");
    Ok(params)
}
