use std::path::PathBuf;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glens_core::params::ParameterMap;
use glens_detector::InterferometerNetwork;
use glens_infer::{GravitationalWaveLikelihood, Likelihood};
use glens_waveform::{build, resolve, AmplificationFiles, WaveformArguments};
use indexmap::IndexMap;

fn injection() -> ParameterMap {
    [
        ("chirp_mass", 28.1),
        ("mass_ratio", 0.8),
        ("luminosity_distance", 400.0),
        ("theta_jn", 0.4),
        ("phase", 1.3),
        ("ra", 1.375),
        ("dec", -1.2108),
        ("psi", 2.659),
        ("geocent_time", 1_126_259_642.413),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

fn bench_likelihood(c: &mut Criterion) {
    let arguments = Arc::new(WaveformArguments {
        reference_frequency: 50.0,
        minimum_frequency: 20.0,
        maximum_frequency: None,
        extra: IndexMap::new(),
        files: AmplificationFiles {
            w_array: PathBuf::new(),
            y_array: PathBuf::new(),
            amp_fac_real: PathBuf::new(),
            amp_fac_imag: PathBuf::new(),
        },
    });
    let resolved = resolve("default", "lal_binary_black_hole").unwrap();
    let generator = build(
        resolved.generator,
        4.0,
        1024.0,
        resolved.source,
        resolved.conversion,
        arguments,
    )
    .unwrap();
    let params = injection();
    let mut network = InterferometerNetwork::build_network(&["H1", "L1", "V1"]).unwrap();
    network.set_frequency_band(20.0, 512.0);
    network
        .simulate_noise(1024.0, 4.0, params["geocent_time"] - 3.0, 5)
        .unwrap();
    network.inject(&generator, &params).unwrap();
    let likelihood = GravitationalWaveLikelihood::new(&network, &generator).unwrap();

    c.bench_function("log_likelihood_three_detectors", |b| {
        b.iter(|| likelihood.log_likelihood(black_box(&params)).unwrap())
    });
}

criterion_group!(benches, bench_likelihood);
criterion_main!(benches);
