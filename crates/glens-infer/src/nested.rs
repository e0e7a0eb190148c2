//! Nested sampling with constrained random-walk replacement.
//!
//! Live points sit in the unit hypercube over the non-fixed priors. At each
//! iteration the lowest-likelihood point is retired with prior volume
//! `X_i = exp(-i / nlive)` and replaced by a random walk started from another
//! live point and restricted to likelihoods above the retired one.

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use glens_core::RngHandle;
use glens_prior::PriorSet;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::likelihood::Likelihood;
use crate::settings::NestedSettings;

/// A retired or final live point with its evidence weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSample {
    /// Full parameter set, fixed parameters included.
    pub params: ParameterMap,
    /// Log-likelihood.
    pub log_likelihood: f64,
    /// Log of the importance weight (prior mass times likelihood).
    pub log_weight: f64,
}

/// Output of one nested sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedRun {
    /// Log evidence.
    pub log_evidence: f64,
    /// Statistical error on the log evidence, `sqrt(H / nlive)`.
    pub log_evidence_err: f64,
    /// Information `H` in nats.
    pub information: f64,
    /// Iterations before the final live points were added.
    pub iterations: usize,
    /// Total likelihood evaluations.
    pub likelihood_evaluations: usize,
    /// Names explored by the sampler.
    pub search_parameters: Vec<String>,
    /// Weighted samples in retirement order.
    pub samples: Vec<WeightedSample>,
    /// Equally weighted posterior draws.
    pub posterior: Vec<ParameterMap>,
}

struct LivePoint {
    unit: Vec<f64>,
    params: ParameterMap,
    log_likelihood: f64,
}

struct Evaluator<'a, L: Likelihood> {
    likelihood: &'a L,
    priors: &'a PriorSet,
    calls: usize,
}

impl<L: Likelihood> Evaluator<'_, L> {
    fn point(&mut self, unit: Vec<f64>) -> Result<LivePoint, LensError> {
        let params = self.priors.rescale(&unit);
        let log_likelihood = self.likelihood.log_likelihood(&params)?;
        self.calls += 1;
        if !log_likelihood.is_finite() {
            return Err(LensError::Sampler(
                ErrorInfo::new("non-finite-likelihood", "likelihood returned a non-finite value")
                    .with_context("value", log_likelihood.to_string())
                    .with_context("iteration_calls", self.calls.to_string()),
            ));
        }
        Ok(LivePoint {
            unit,
            params,
            log_likelihood,
        })
    }
}

/// Runs nested sampling of `likelihood` over `priors`.
pub fn sample<L: Likelihood>(
    likelihood: &L,
    priors: &PriorSet,
    settings: &NestedSettings,
    seed: u64,
) -> Result<NestedRun, LensError> {
    if settings.nlive == 0 {
        return Err(LensError::Sampler(ErrorInfo::new(
            "no-live-points",
            "nested sampling needs at least one live point",
        )));
    }
    let search_parameters = priors.sampled_names();
    let ndim = search_parameters.len();
    let mut rng = RngHandle::from_seed(seed);
    let mut evaluator = Evaluator {
        likelihood,
        priors,
        calls: 0,
    };

    if ndim == 0 {
        let point = evaluator.point(Vec::new())?;
        return Ok(NestedRun {
            log_evidence: point.log_likelihood,
            log_evidence_err: 0.0,
            information: 0.0,
            iterations: 0,
            likelihood_evaluations: evaluator.calls,
            search_parameters,
            samples: vec![WeightedSample {
                params: point.params.clone(),
                log_likelihood: point.log_likelihood,
                log_weight: point.log_likelihood,
            }],
            posterior: vec![point.params],
        });
    }

    let nlive = settings.nlive;
    let mut live = Vec::with_capacity(nlive);
    for _ in 0..nlive {
        let unit: Vec<f64> = (0..ndim).map(|_| rng.gen::<f64>()).collect();
        live.push(evaluator.point(unit)?);
    }

    let shrink = (1.0 - (-1.0 / nlive as f64).exp()).ln();
    let mut log_evidence = f64::NEG_INFINITY;
    let mut information = 0.0;
    let mut log_volume = 0.0;
    let mut scale = 0.1;
    let mut samples = Vec::new();
    let mut iterations = 0;

    while iterations < settings.maxiter {
        iterations += 1;
        let worst = lowest(&live);
        let threshold = live[worst].log_likelihood;
        let log_weight = log_volume + shrink + threshold;
        accumulate(&mut log_evidence, &mut information, log_weight, threshold);
        samples.push(WeightedSample {
            params: live[worst].params.clone(),
            log_likelihood: threshold,
            log_weight,
        });
        log_volume -= 1.0 / nlive as f64;

        let start = if nlive > 1 {
            let mut pick = rng.gen_range(0..nlive - 1);
            if pick >= worst {
                pick += 1;
            }
            pick
        } else {
            worst
        };
        let (replacement, accepted) = random_walk(
            &mut evaluator,
            &mut rng,
            &live[start],
            threshold,
            settings.walks,
            scale,
        )?;
        let rejected = settings.walks - accepted;
        if accepted > rejected {
            scale *= (1.0 / accepted as f64).exp();
        } else if rejected > 0 {
            scale /= (1.0 / rejected as f64).exp();
        }
        scale = scale.clamp(1e-6, 1.0);
        live[worst] = replacement;

        let log_max = live
            .iter()
            .map(|point| point.log_likelihood)
            .fold(f64::NEG_INFINITY, f64::max);
        let remaining = log_max + log_volume;
        if iterations % 500 == 0 {
            tracing::debug!(
                iterations,
                log_evidence,
                remaining = remaining - log_evidence,
                scale,
                "nested sampling progress"
            );
        }
        if remaining - log_evidence < settings.dlogz {
            break;
        }
    }
    if iterations >= settings.maxiter {
        tracing::warn!(maxiter = settings.maxiter, "nested sampling stopped at the iteration cap");
    }

    let log_final = log_volume - (nlive as f64).ln();
    live.sort_by(|a, b| a.log_likelihood.total_cmp(&b.log_likelihood));
    for point in live {
        let log_weight = log_final + point.log_likelihood;
        accumulate(&mut log_evidence, &mut information, log_weight, point.log_likelihood);
        samples.push(WeightedSample {
            params: point.params,
            log_likelihood: point.log_likelihood,
            log_weight,
        });
    }

    let posterior = resample(&samples, log_evidence, &mut rng);
    Ok(NestedRun {
        log_evidence,
        log_evidence_err: (information.max(0.0) / nlive as f64).sqrt(),
        information,
        iterations,
        likelihood_evaluations: evaluator.calls,
        search_parameters,
        samples,
        posterior,
    })
}

fn lowest(live: &[LivePoint]) -> usize {
    live.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.log_likelihood.total_cmp(&b.log_likelihood))
        .map_or(0, |(index, _)| index)
}

fn log_add_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + ((a - max).exp() + (b - max).exp()).ln()
}

/// Updates the evidence and Skilling's information estimate with one weight.
fn accumulate(log_evidence: &mut f64, information: &mut f64, log_weight: f64, log_likelihood: f64) {
    if log_weight == f64::NEG_INFINITY {
        return;
    }
    let previous = *log_evidence;
    let updated = log_add_exp(previous, log_weight);
    let carried = if previous == f64::NEG_INFINITY {
        0.0
    } else {
        (previous - updated).exp() * (*information + previous)
    };
    *information = (log_weight - updated).exp() * log_likelihood + carried - updated;
    *log_evidence = updated;
}

fn random_walk<L: Likelihood>(
    evaluator: &mut Evaluator<'_, L>,
    rng: &mut RngHandle,
    start: &LivePoint,
    threshold: f64,
    walks: usize,
    scale: f64,
) -> Result<(LivePoint, usize), LensError> {
    let mut current = LivePoint {
        unit: start.unit.clone(),
        params: start.params.clone(),
        log_likelihood: start.log_likelihood,
    };
    let mut accepted = 0;
    for _ in 0..walks {
        let proposal: Vec<f64> = current
            .unit
            .iter()
            .map(|u| u + scale * rng.sample::<f64, _>(StandardNormal))
            .collect();
        if proposal.iter().any(|u| !(0.0..=1.0).contains(u)) {
            continue;
        }
        let candidate = evaluator.point(proposal)?;
        if candidate.log_likelihood > threshold {
            current = candidate;
            accepted += 1;
        }
    }
    Ok((current, accepted))
}

/// Systematic resampling to `round(ESS)` equally weighted draws.
fn resample(samples: &[WeightedSample], log_evidence: f64, rng: &mut RngHandle) -> Vec<ParameterMap> {
    let weights: Vec<f64> = samples
        .iter()
        .map(|sample| (sample.log_weight - log_evidence).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return Vec::new();
    }
    let squares: f64 = weights.iter().map(|w| (w / total) * (w / total)).sum();
    let draws = ((1.0 / squares).round() as usize).max(1);
    let offset: f64 = rng.gen::<f64>();
    let mut posterior = Vec::with_capacity(draws);
    let mut cumulative = 0.0;
    let mut index = 0;
    for draw in 0..draws {
        let target = (draw as f64 + offset) / draws as f64;
        while index + 1 < weights.len() && cumulative + weights[index] / total < target {
            cumulative += weights[index] / total;
            index += 1;
        }
        posterior.push(samples[index].params.clone());
    }
    posterior
}

#[cfg(test)]
mod tests {
    use super::*;
    use glens_prior::Prior;

    struct Gaussian2d {
        sigma: f64,
    }

    impl Likelihood for Gaussian2d {
        fn log_likelihood(&self, params: &ParameterMap) -> Result<f64, LensError> {
            let r2 = params["x"].powi(2) + params["y"].powi(2);
            let s2 = self.sigma * self.sigma;
            Ok(-0.5 * r2 / s2 - (2.0 * std::f64::consts::PI * s2).ln())
        }

        fn noise_log_likelihood(&self) -> f64 {
            f64::NEG_INFINITY
        }
    }

    fn priors() -> PriorSet {
        [
            ("x".to_string(), Prior::Uniform { minimum: -5.0, maximum: 5.0 }),
            ("y".to_string(), Prior::Uniform { minimum: -5.0, maximum: 5.0 }),
            ("z".to_string(), Prior::fixed(2.0)),
        ]
        .into_iter()
        .collect()
    }

    fn settings() -> NestedSettings {
        NestedSettings {
            nlive: 200,
            walks: 20,
            ..NestedSettings::default()
        }
    }

    #[test]
    fn evidence_of_normalised_gaussian_matches_prior_volume() {
        let run = sample(&Gaussian2d { sigma: 0.5 }, &priors(), &settings(), 17).unwrap();
        // Z = 1 / prior area.
        let expected = -(100f64).ln();
        assert!(
            (run.log_evidence - expected).abs() < 0.6,
            "ln Z = {} expected {}",
            run.log_evidence,
            expected
        );
        assert!(run.log_evidence_err > 0.0);
        assert_eq!(run.search_parameters, vec!["x", "y"]);
        assert!(!run.posterior.is_empty());
        let mean_x =
            run.posterior.iter().map(|p| p["x"]).sum::<f64>() / run.posterior.len() as f64;
        assert!(mean_x.abs() < 0.25, "posterior mean {mean_x}");
        assert!(run.posterior.iter().all(|p| p["z"] == 2.0));
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let first = sample(&Gaussian2d { sigma: 1.0 }, &priors(), &settings(), 3).unwrap();
        let second = sample(&Gaussian2d { sigma: 1.0 }, &priors(), &settings(), 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn iteration_cap_is_honoured() {
        let capped = NestedSettings {
            nlive: 20,
            walks: 5,
            maxiter: 15,
            ..NestedSettings::default()
        };
        let run = sample(&Gaussian2d { sigma: 0.1 }, &priors(), &capped, 1).unwrap();
        assert_eq!(run.iterations, 15);
        assert_eq!(run.samples.len(), 15 + 20);
    }

    #[test]
    fn fully_fixed_priors_evaluate_once() {
        let fixed: PriorSet = [
            ("x".to_string(), Prior::fixed(0.0)),
            ("y".to_string(), Prior::fixed(0.0)),
        ]
        .into_iter()
        .collect();
        let run = sample(&Gaussian2d { sigma: 1.0 }, &fixed, &settings(), 1).unwrap();
        assert_eq!(run.likelihood_evaluations, 1);
        assert!((run.log_evidence + (2.0 * std::f64::consts::PI).ln()).abs() < 1e-12);
    }

    #[test]
    fn non_finite_likelihood_is_a_sampler_error() {
        struct Broken;
        impl Likelihood for Broken {
            fn log_likelihood(&self, _: &ParameterMap) -> Result<f64, LensError> {
                Ok(f64::NAN)
            }
            fn noise_log_likelihood(&self) -> f64 {
                0.0
            }
        }
        let err = sample(&Broken, &priors(), &settings(), 1).unwrap_err();
        assert!(matches!(err, LensError::Sampler(_)));
        assert_eq!(err.info().code, "non-finite-likelihood");
    }

    #[test]
    fn negative_infinite_likelihood_is_a_sampler_error() {
        struct Excluded;
        impl Likelihood for Excluded {
            fn log_likelihood(&self, _: &ParameterMap) -> Result<f64, LensError> {
                Ok(f64::NEG_INFINITY)
            }
            fn noise_log_likelihood(&self) -> f64 {
                0.0
            }
        }
        let small = NestedSettings {
            nlive: 10,
            walks: 3,
            maxiter: 50,
            ..NestedSettings::default()
        };
        let err = sample(&Excluded, &priors(), &small, 1).unwrap_err();
        assert!(matches!(err, LensError::Sampler(_)));
        assert_eq!(err.info().code, "non-finite-likelihood");
    }

    #[test]
    fn zero_live_points_fail() {
        let empty = NestedSettings {
            nlive: 0,
            ..NestedSettings::default()
        };
        let err = sample(&Gaussian2d { sigma: 1.0 }, &priors(), &empty, 1).unwrap_err();
        assert_eq!(err.info().code, "no-live-points");
    }
}
