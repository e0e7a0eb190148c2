//! Ordered name to value parameter maps.

use indexmap::IndexMap;

use crate::errors::{ErrorInfo, LensError};

/// Ordered mapping of parameter name to value.
///
/// Insertion order follows the configuration file so persisted artifacts list
/// parameters the way the user wrote them.
pub type ParameterMap = IndexMap<String, f64>;

/// Names of the lensing parameters fixed to zero under the null hypothesis.
pub const LENSING_PARAMETERS: [&str; 3] =
    ["lens_mass", "impact_parameter", "lens_fractional_distance"];

/// Looks up a required parameter.
pub fn require(params: &ParameterMap, name: &str) -> Result<f64, LensError> {
    params.get(name).copied().ok_or_else(|| {
        LensError::UnknownParameter(
            ErrorInfo::new("parameter-missing", "required parameter is absent")
                .with_context("parameter", name),
        )
    })
}
