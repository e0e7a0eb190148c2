//! Priors for the lensed and unlensed hypotheses.

pub mod builder;
pub mod distribution;
pub mod set;

pub use builder::{fix, load, zero_lensing_parameters};
pub use distribution::{standard_normal_quantile, Prior};
pub use set::PriorSet;
