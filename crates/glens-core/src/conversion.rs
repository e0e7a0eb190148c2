//! Closed-form relations between component masses and their derived pair.

use crate::errors::{ErrorInfo, LensError};

/// Chirp mass `(m1 m2)^(3/5) / (m1 + m2)^(1/5)`.
pub fn component_masses_to_chirp_mass(mass_1: f64, mass_2: f64) -> f64 {
    (mass_1 * mass_2).powf(0.6) / (mass_1 + mass_2).powf(0.2)
}

/// Ratio of the lighter to the heavier component, always `<= 1`.
pub fn component_masses_to_mass_ratio(mass_1: f64, mass_2: f64) -> f64 {
    (mass_2 / mass_1).min(mass_1 / mass_2)
}

/// Inverts the chirp mass and mass ratio into `(mass_1, mass_2)` with `mass_1 >= mass_2`.
pub fn chirp_mass_and_mass_ratio_to_component_masses(
    chirp_mass: f64,
    mass_ratio: f64,
) -> Result<(f64, f64), LensError> {
    if !(chirp_mass > 0.0) || !(mass_ratio > 0.0) || mass_ratio > 1.0 {
        return Err(LensError::ValueConversion(
            ErrorInfo::new(
                "invalid-mass-pair",
                "chirp mass must be positive and mass ratio must lie in (0, 1]",
            )
            .with_context("chirp_mass", chirp_mass.to_string())
            .with_context("mass_ratio", mass_ratio.to_string()),
        ));
    }
    let total_mass = chirp_mass * (1.0 + mass_ratio).powf(1.2) / mass_ratio.powf(0.6);
    let mass_1 = total_mass / (1.0 + mass_ratio);
    Ok((mass_1, mass_ratio * mass_1))
}

/// Validates that both component masses are strictly positive and finite.
pub fn check_component_masses(mass_1: f64, mass_2: f64) -> Result<(), LensError> {
    if mass_1.is_finite() && mass_2.is_finite() && mass_1 > 0.0 && mass_2 > 0.0 {
        Ok(())
    } else {
        Err(LensError::ValueConversion(
            ErrorInfo::new("invalid-component-mass", "component masses must be positive")
                .with_context("mass_1", mass_1.to_string())
                .with_context("mass_2", mass_2.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirp_mass_matches_reference_values() {
        let chirp = component_masses_to_chirp_mass(30.0, 20.0);
        assert!((chirp - 21.237_175).abs() < 1e-5);
        let equal = component_masses_to_chirp_mass(10.0, 10.0);
        assert!((equal - 10.0 * 2.0_f64.powf(-0.2)).abs() < 1e-9);
    }

    #[test]
    fn inversion_recovers_heavier_first() {
        let (m1, m2) = chirp_mass_and_mass_ratio_to_component_masses(
            component_masses_to_chirp_mass(20.0, 30.0),
            component_masses_to_mass_ratio(20.0, 30.0),
        )
        .unwrap();
        assert!((m1 - 30.0).abs() < 1e-9);
        assert!((m2 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn inversion_rejects_ratio_above_one() {
        let err = chirp_mass_and_mass_ratio_to_component_masses(20.0, 1.5).unwrap_err();
        assert_eq!(err.info().code, "invalid-mass-pair");
    }
}
