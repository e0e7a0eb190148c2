//! Detector geometry and antenna response.

use std::fmt::{self, Display};
use std::str::FromStr;

use glens_core::constants::{C, EARTH_SEMI_MAJOR_AXIS, EARTH_SEMI_MINOR_AXIS};
use glens_core::errors::{ErrorInfo, LensError};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Detectors known to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorName {
    /// LIGO Hanford.
    H1,
    /// LIGO Livingston.
    L1,
    /// Virgo.
    V1,
    /// KAGRA.
    K1,
}

impl DetectorName {
    /// Canonical two-character identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorName::H1 => "H1",
            DetectorName::L1 => "L1",
            DetectorName::V1 => "V1",
            DetectorName::K1 => "K1",
        }
    }
}

impl FromStr for DetectorName {
    type Err = LensError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "H1" => Ok(DetectorName::H1),
            "L1" => Ok(DetectorName::L1),
            "V1" => Ok(DetectorName::V1),
            "K1" => Ok(DetectorName::K1),
            _ => Err(LensError::UnknownDetector(
                ErrorInfo::new("unknown-detector", "detector is not known to the simulator")
                    .with_context("name", value.trim())
                    .with_hint("known detectors: H1, L1, V1, K1"),
            )),
        }
    }
}

impl Display for DetectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polarization mode of a gravitational wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarization {
    /// Plus polarization.
    Plus,
    /// Cross polarization.
    Cross,
}

/// Fixed geometry of an L-shaped interferometer.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorGeometry {
    /// Vertex latitude (rad).
    pub latitude: f64,
    /// Vertex longitude (rad).
    pub longitude: f64,
    /// Vertex elevation above the WGS-84 ellipsoid (m).
    pub elevation: f64,
    /// X-arm azimuth, north of east (rad).
    pub xarm_azimuth: f64,
    /// Y-arm azimuth, north of east (rad).
    pub yarm_azimuth: f64,
}

impl DetectorGeometry {
    /// Geometry of a named detector.
    pub fn of(name: DetectorName) -> Self {
        let (latitude, longitude, elevation, xarm, yarm): (f64, f64, f64, f64, f64) = match name {
            DetectorName::H1 => (46.455_144, -119.407_656, 142.554, 125.9994, 215.9994),
            DetectorName::L1 => (30.562_894, -90.774_242, -6.574, 197.7165, 287.7165),
            DetectorName::V1 => (43.631_414, 10.504_497, 51.884, 70.5674, 340.5674),
            DetectorName::K1 => (36.411_9, 137.306_6, 414.181, 29.6, 119.6),
        };
        Self {
            latitude: latitude.to_radians(),
            longitude: longitude.to_radians(),
            elevation,
            xarm_azimuth: xarm.to_radians(),
            yarm_azimuth: yarm.to_radians(),
        }
    }

    fn arm(&self, azimuth: f64) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        let east = Vector3::new(-sin_lon, cos_lon, 0.0);
        let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
        east * azimuth.cos() + north * azimuth.sin()
    }

    /// Unit vector along the x arm (Earth-fixed frame).
    pub fn x_arm(&self) -> Vector3<f64> {
        self.arm(self.xarm_azimuth)
    }

    /// Unit vector along the y arm (Earth-fixed frame).
    pub fn y_arm(&self) -> Vector3<f64> {
        self.arm(self.yarm_azimuth)
    }

    /// Detector tensor `(x x^T - y y^T) / 2`.
    pub fn tensor(&self) -> Matrix3<f64> {
        let x = self.x_arm();
        let y = self.y_arm();
        (x * x.transpose() - y * y.transpose()) * 0.5
    }

    /// Vertex position in Earth-centred Earth-fixed coordinates (m).
    pub fn vertex(&self) -> Vector3<f64> {
        let a2 = EARTH_SEMI_MAJOR_AXIS * EARTH_SEMI_MAJOR_AXIS;
        let b2 = EARTH_SEMI_MINOR_AXIS * EARTH_SEMI_MINOR_AXIS;
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        let radius = a2 / (a2 * cos_lat * cos_lat + b2 * sin_lat * sin_lat).sqrt();
        Vector3::new(
            (radius + self.elevation) * cos_lat * cos_lon,
            (radius + self.elevation) * cos_lat * sin_lon,
            (b2 / a2 * radius + self.elevation) * sin_lat,
        )
    }

    /// Antenna response to one polarization from sky position `(ra, dec)`.
    pub fn antenna_response(&self, ra: f64, dec: f64, psi: f64, gmst: f64, mode: Polarization) -> f64 {
        let tensor = polarization_tensor(ra, dec, psi, gmst, mode);
        self.tensor().component_mul(&tensor).sum()
    }

    /// Arrival time at the vertex relative to the geocentre (s).
    pub fn time_delay_from_geocenter(&self, ra: f64, dec: f64, gmst: f64) -> f64 {
        -self.vertex().dot(&propagation_source(ra, dec, gmst)) / C
    }
}

fn propagation_source(ra: f64, dec: f64, gmst: f64) -> Vector3<f64> {
    let phi = ra - gmst;
    let theta = std::f64::consts::FRAC_PI_2 - dec;
    Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
}

/// Polarization basis tensor for a source at `(ra, dec)` with angle `psi`.
pub fn polarization_tensor(ra: f64, dec: f64, psi: f64, gmst: f64, mode: Polarization) -> Matrix3<f64> {
    let phi = ra - gmst;
    let theta = std::f64::consts::FRAC_PI_2 - dec;
    let u = Vector3::new(phi.cos() * theta.cos(), theta.cos() * phi.sin(), -theta.sin());
    let v = Vector3::new(-phi.sin(), phi.cos(), 0.0);
    let m = -u * psi.sin() - v * psi.cos();
    let n = -u * psi.cos() + v * psi.sin();
    match mode {
        Polarization::Plus => m * m.transpose() - n * n.transpose(),
        Polarization::Cross => m * n.transpose() + n * m.transpose(),
    }
}
