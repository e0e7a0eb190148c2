//! One-dimensional prior distributions.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prior on a single parameter.
///
/// Every variant maps the unit interval onto its support through
/// [`Prior::rescale`], which is what the nested sampler explores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prior {
    /// Flat on `[minimum, maximum]`.
    Uniform {
        /// Lower bound.
        minimum: f64,
        /// Upper bound.
        maximum: f64,
    },
    /// Flat in `ln x` on `[minimum, maximum]`.
    LogUniform {
        /// Lower bound (positive).
        minimum: f64,
        /// Upper bound.
        maximum: f64,
    },
    /// `p(x) ∝ x^alpha` on `[minimum, maximum]`.
    PowerLaw {
        /// Power-law index.
        alpha: f64,
        /// Lower bound (positive).
        minimum: f64,
        /// Upper bound.
        maximum: f64,
    },
    /// Normal distribution.
    Gaussian {
        /// Mean.
        mu: f64,
        /// Standard deviation.
        sigma: f64,
    },
    /// `p(x) ∝ sin x`, used for polar angles.
    Sine {
        /// Lower bound.
        #[serde(default)]
        minimum: f64,
        /// Upper bound.
        #[serde(default = "default_pi")]
        maximum: f64,
    },
    /// `p(x) ∝ cos x`, used for declinations.
    Cosine {
        /// Lower bound.
        #[serde(default = "default_minus_half_pi")]
        minimum: f64,
        /// Upper bound.
        #[serde(default = "default_half_pi")]
        maximum: f64,
    },
    /// All mass at `peak`.
    DeltaFunction {
        /// Fixed value.
        peak: f64,
    },
}

fn default_pi() -> f64 {
    PI
}

fn default_half_pi() -> f64 {
    FRAC_PI_2
}

fn default_minus_half_pi() -> f64 {
    -FRAC_PI_2
}

impl Prior {
    /// Degenerate prior at `value`.
    pub fn fixed(value: f64) -> Self {
        Prior::DeltaFunction { peak: value }
    }

    /// Whether the prior has a single allowed value.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Prior::DeltaFunction { .. })
    }

    /// Identifier written to prior files.
    pub fn kind(&self) -> &'static str {
        match self {
            Prior::Uniform { .. } => "uniform",
            Prior::LogUniform { .. } => "log_uniform",
            Prior::PowerLaw { .. } => "power_law",
            Prior::Gaussian { .. } => "gaussian",
            Prior::Sine { .. } => "sine",
            Prior::Cosine { .. } => "cosine",
            Prior::DeltaFunction { .. } => "delta_function",
        }
    }

    /// Checks the distribution parameters, returning a diagnostic on failure.
    pub fn validate(&self) -> Result<(), String> {
        let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());
        match *self {
            Prior::Uniform { minimum, maximum } => ordered(minimum, maximum, finite(&[minimum, maximum])),
            Prior::LogUniform { minimum, maximum } | Prior::PowerLaw { minimum, maximum, .. } => {
                ordered(minimum, maximum, finite(&[minimum, maximum]))?;
                if minimum <= 0.0 {
                    return Err(format!("minimum must be positive, got {minimum}"));
                }
                if let Prior::PowerLaw { alpha, .. } = *self {
                    if !alpha.is_finite() {
                        return Err("alpha must be finite".to_string());
                    }
                }
                Ok(())
            }
            Prior::Gaussian { mu, sigma } => {
                if !finite(&[mu, sigma]) || sigma <= 0.0 {
                    return Err(format!("sigma must be positive and finite, got {sigma}"));
                }
                Ok(())
            }
            Prior::Sine { minimum, maximum } => {
                ordered(minimum, maximum, finite(&[minimum, maximum]))?;
                if minimum < 0.0 || maximum > PI {
                    return Err("sine prior support must lie within [0, pi]".to_string());
                }
                Ok(())
            }
            Prior::Cosine { minimum, maximum } => {
                ordered(minimum, maximum, finite(&[minimum, maximum]))?;
                if minimum < -FRAC_PI_2 || maximum > FRAC_PI_2 {
                    return Err("cosine prior support must lie within [-pi/2, pi/2]".to_string());
                }
                Ok(())
            }
            Prior::DeltaFunction { peak } => {
                if peak.is_finite() {
                    Ok(())
                } else {
                    Err("peak must be finite".to_string())
                }
            }
        }
    }

    /// Maps `u` in `[0, 1]` onto the support (inverse CDF).
    pub fn rescale(&self, u: f64) -> f64 {
        match *self {
            Prior::Uniform { minimum, maximum } => minimum + u * (maximum - minimum),
            Prior::LogUniform { minimum, maximum } => minimum * (maximum / minimum).powf(u),
            Prior::PowerLaw { alpha, minimum, maximum } => {
                if alpha == -1.0 {
                    minimum * (maximum / minimum).powf(u)
                } else {
                    let k = alpha + 1.0;
                    let lo = minimum.powf(k);
                    let hi = maximum.powf(k);
                    (lo + u * (hi - lo)).powf(1.0 / k)
                }
            }
            Prior::Gaussian { mu, sigma } => mu + sigma * standard_normal_quantile(u),
            Prior::Sine { minimum, maximum } => {
                let lo = minimum.cos();
                (lo - u * (lo - maximum.cos())).clamp(-1.0, 1.0).acos()
            }
            Prior::Cosine { minimum, maximum } => {
                let lo = minimum.sin();
                (lo + u * (maximum.sin() - lo)).clamp(-1.0, 1.0).asin()
            }
            Prior::DeltaFunction { peak } => peak,
        }
    }

    /// Log density at `x`; `-inf` outside the support.
    pub fn ln_prob(&self, x: f64) -> f64 {
        match *self {
            Prior::Uniform { minimum, maximum } => {
                if within(x, minimum, maximum) {
                    -(maximum - minimum).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::LogUniform { minimum, maximum } => {
                if within(x, minimum, maximum) {
                    -x.ln() - (maximum / minimum).ln().ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::PowerLaw { alpha, minimum, maximum } => {
                if !within(x, minimum, maximum) {
                    f64::NEG_INFINITY
                } else if alpha == -1.0 {
                    -x.ln() - (maximum / minimum).ln().ln()
                } else {
                    let k = alpha + 1.0;
                    (k / (maximum.powf(k) - minimum.powf(k))).ln() + alpha * x.ln()
                }
            }
            Prior::Gaussian { mu, sigma } => {
                let z = (x - mu) / sigma;
                -0.5 * z * z - (sigma * (2.0 * PI).sqrt()).ln()
            }
            Prior::Sine { minimum, maximum } => {
                if within(x, minimum, maximum) {
                    (x.sin() / (minimum.cos() - maximum.cos())).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::Cosine { minimum, maximum } => {
                if within(x, minimum, maximum) {
                    (x.cos() / (maximum.sin() - minimum.sin())).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::DeltaFunction { peak } => {
                if x == peak {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            }
        }
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.rescale(rng.gen::<f64>())
    }
}

fn within(x: f64, minimum: f64, maximum: f64) -> bool {
    x >= minimum && x <= maximum
}

fn ordered(minimum: f64, maximum: f64, finite: bool) -> Result<(), String> {
    if !finite || minimum >= maximum {
        return Err(format!(
            "bounds must be finite with minimum < maximum, got [{minimum}, {maximum}]"
        ));
    }
    Ok(())
}

/// Quantile of the standard normal distribution.
///
/// Acklam's rational approximation; relative error below 1.2e-9.
pub fn standard_normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const LOW: f64 = 0.024_25;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glens_core::RngHandle;

    #[test]
    fn normal_quantile_matches_reference_points() {
        assert!(standard_normal_quantile(0.5).abs() < 1e-12);
        assert!((standard_normal_quantile(0.975) - 1.959_963_984_540_054).abs() < 1e-8);
        assert!((standard_normal_quantile(0.01) + 2.326_347_874_040_841).abs() < 1e-8);
    }

    #[test]
    fn rescale_hits_support_edges() {
        let priors = [
            Prior::Uniform { minimum: 2.0, maximum: 5.0 },
            Prior::LogUniform { minimum: 1.0, maximum: 1e3 },
            Prior::PowerLaw { alpha: 2.0, minimum: 10.0, maximum: 1e3 },
            Prior::Sine { minimum: 0.0, maximum: PI },
            Prior::Cosine { minimum: -FRAC_PI_2, maximum: FRAC_PI_2 },
        ];
        for prior in priors {
            let (lo, hi) = match prior {
                Prior::Uniform { minimum, maximum }
                | Prior::LogUniform { minimum, maximum }
                | Prior::PowerLaw { minimum, maximum, .. }
                | Prior::Sine { minimum, maximum }
                | Prior::Cosine { minimum, maximum } => (minimum, maximum),
                _ => unreachable!(),
            };
            assert!((prior.rescale(0.0) - lo).abs() < 1e-9 * hi.abs().max(1.0), "{prior:?}");
            assert!((prior.rescale(1.0) - hi).abs() < 1e-9 * hi.abs().max(1.0), "{prior:?}");
            assert!(prior.ln_prob(prior.rescale(0.3)).is_finite());
            assert_eq!(prior.ln_prob(hi + 1.0), f64::NEG_INFINITY);
        }
    }

    #[test]
    fn uniform_density_is_normalised() {
        let prior = Prior::Uniform { minimum: 0.0, maximum: 4.0 };
        assert!((prior.ln_prob(1.0).exp() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn delta_function_always_returns_peak() {
        let prior = Prior::fixed(1_126_259_642.413);
        let mut rng = RngHandle::from_seed(9);
        for _ in 0..100 {
            assert_eq!(prior.sample(&mut rng), 1_126_259_642.413);
        }
        assert_eq!(prior.ln_prob(1_126_259_642.413), 0.0);
        assert!(prior.is_fixed());
    }

    #[test]
    fn invalid_bounds_fail_validation() {
        assert!(Prior::Uniform { minimum: 3.0, maximum: 3.0 }.validate().is_err());
        assert!(Prior::LogUniform { minimum: 0.0, maximum: 3.0 }.validate().is_err());
        assert!(Prior::Gaussian { mu: 0.0, sigma: -1.0 }.validate().is_err());
        assert!(Prior::Sine { minimum: 0.0, maximum: 4.0 }.validate().is_err());
        assert!(Prior::Cosine { minimum: -FRAC_PI_2, maximum: 0.2 }.validate().is_ok());
    }
}
