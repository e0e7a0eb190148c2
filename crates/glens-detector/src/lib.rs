//! Simulated gravitational-wave detector network.
//!
//! A network is built from detector names, filled with one Gaussian noise
//! realisation per detector and then receives a single signal injection. The
//! resulting strain is shared read-only by every downstream likelihood.

pub mod geometry;
pub mod interferometer;
pub mod network;
pub mod psd;
pub mod time;

pub use geometry::{DetectorGeometry, DetectorName, Polarization};
pub use interferometer::{noise_weighted_inner_product, InjectionReport, Interferometer, StrainData};
pub use network::{InterferometerNetwork, PRE_MERGER_BUFFER};
pub use psd::PowerSpectralDensity;
pub use time::greenwich_mean_sidereal_time;
