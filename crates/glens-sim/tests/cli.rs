use std::process::Command;

use tempfile::tempdir;

#[test]
fn missing_configuration_terminates_with_failure() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_glens-sim"))
        .arg(dir.path().join("absent.toml"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config-missing"), "stderr: {stderr}");
    assert!(!dir.path().join("absent.toml").exists());
}

#[test]
fn configuration_path_is_required() {
    let output = Command::new(env!("CARGO_BIN_EXE_glens-sim")).output().unwrap();
    assert!(!output.status.success());
}
