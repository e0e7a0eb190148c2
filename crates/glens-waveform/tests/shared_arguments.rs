use std::path::Path;
use std::sync::Arc;

use glens_config::RunConfiguration;
use glens_core::params::ParameterMap;
use glens_core::LensError;
use glens_waveform::{
    build, resolve, AmplificationDataProvider, DeploymentMode, LocalAmplificationProvider,
    WaveformArguments,
};
use tempfile::tempdir;

fn config(outdir: &Path) -> RunConfiguration {
    RunConfiguration::parse(&format!(
        r#"
[bilby_setup]
label = "unit"
outdir = "{}"
duration = 4
sampling_frequency = 512
lensed_waveform_generator_class = "lensed"
lensed_frequency_domain_source_model = "lensed_bbh_model"
detectors = "H1, L1"
sampler = "nested"
plot_corner = false

[data_settings]
data_subdir = "lens_data"
create_unlensed_prep_run = true
unlensed_waveform_generator_class = "default"
unlensed_frequency_domain_source_model = "lal_binary_black_hole"

[waveform_arguments]
reference_frequency = 50
minimum_frequency = 20

[lens_settings]
npoints_w = 40
npoints_y = 12
"#,
        outdir.display()
    ))
    .unwrap()
}

fn injection() -> ParameterMap {
    [
        ("mass_1", 30.0),
        ("mass_2", 20.0),
        ("luminosity_distance", 500.0),
        ("theta_jn", 0.3),
        ("phase", 0.7),
        ("lens_mass", 800.0),
        ("impact_parameter", 0.4),
        ("lens_fractional_distance", 0.5),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect()
}

#[test]
fn provider_writes_four_tables_and_reuses_them() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let files = LocalAmplificationProvider
        .provide(&config, DeploymentMode::Local)
        .unwrap();
    for path in [&files.w_array, &files.y_array, &files.amp_fac_real, &files.amp_fac_imag] {
        assert!(path.is_file(), "{} missing", path.display());
        assert!(path.starts_with(dir.path().join("lens_data")));
    }
    let again = LocalAmplificationProvider
        .provide(&config, DeploymentMode::Local)
        .unwrap();
    assert_eq!(files, again);
}

#[test]
fn lensed_and_unlensed_generators_share_arguments() {
    let dir = tempdir().unwrap();
    let config = config(dir.path());
    let files = LocalAmplificationProvider
        .provide(&config, DeploymentMode::Local)
        .unwrap();
    let arguments = Arc::new(WaveformArguments::from_config(&config, files).unwrap());

    let lensed = resolve("lensed", "lensed_bbh_model").unwrap();
    let unlensed = resolve("default", "lal_binary_black_hole").unwrap();
    let lensed = build(
        lensed.generator,
        4.0,
        512.0,
        lensed.source,
        lensed.conversion,
        Arc::clone(&arguments),
    )
    .unwrap();
    let unlensed = build(
        unlensed.generator,
        4.0,
        512.0,
        unlensed.source,
        unlensed.conversion,
        Arc::clone(&arguments),
    )
    .unwrap();

    assert!(Arc::ptr_eq(lensed.arguments(), unlensed.arguments()));
    assert_eq!(lensed.frequency_array(), unlensed.frequency_array());
    assert!(lensed.amplification_table().is_some());
    assert!(unlensed.amplification_table().is_none());

    let params = injection();
    let with_lens = lensed.frequency_domain_strain(&params).unwrap();
    let without_lens = unlensed.frequency_domain_strain(&params).unwrap();
    assert_ne!(with_lens, without_lens);

    let mut null = params.clone();
    null.insert("lens_mass".into(), 0.0);
    let null_lensed = lensed.frequency_domain_strain(&null).unwrap();
    assert_eq!(null_lensed, without_lens);
}

#[test]
fn unknown_generator_class_is_reported_by_name() {
    let err = resolve("bilby.gw.waveform_generator.Typo", "lal_binary_black_hole").unwrap_err();
    assert!(matches!(err, LensError::UnknownModel(_)));
    assert_eq!(
        err.info().context["name"],
        "bilby.gw.waveform_generator.Typo"
    );
}
