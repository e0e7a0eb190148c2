//! Physical constants in SI units.

/// Newtonian gravitational constant (m^3 kg^-1 s^-2).
pub const G: f64 = 6.674_30e-11;
/// Speed of light in vacuum (m s^-1).
pub const C: f64 = 299_792_458.0;
/// Nominal solar mass (kg).
pub const MSUN_SI: f64 = 1.988_409_870_698_051e30;
/// Megaparsec (m).
pub const MPC_SI: f64 = 3.085_677_581_491_367e22;
/// Solar mass expressed as a time, `G M_sun / c^3` (s).
pub const MTSUN_SI: f64 = G * MSUN_SI / (C * C * C);
/// Hubble constant used for low-redshift lens distances (km s^-1 Mpc^-1).
pub const HUBBLE_CONSTANT: f64 = 67.7;
/// Mean equatorial radius of the Earth (m).
pub const EARTH_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// Polar radius of the Earth (m).
pub const EARTH_SEMI_MINOR_AXIS: f64 = 6_356_752.314;
