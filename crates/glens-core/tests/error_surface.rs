use glens_core::errors::{ErrorInfo, LensError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "run.toml")
        .with_context("section", "bilby_setup")
}

#[test]
fn config_error_surface() {
    let err = LensError::ConfigMissing(sample_info("config-missing", "not a file"));
    assert_eq!(err.info().code, "config-missing");
    assert!(err.info().context.contains_key("path"));
    assert!(err.to_string().starts_with("configuration missing"));
}

#[test]
fn model_error_surface() {
    let err = LensError::UnknownModel(
        ErrorInfo::new("unknown-generator-class", "unknown").with_context("name", "Foo"),
    );
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("Foo"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = LensError::PriorFile(sample_info("prior-parse", "bad prior").with_hint("check syntax"));
    let text = err.to_string();
    assert!(text.contains("path=run.toml"));
    assert!(text.contains("hint: check syntax"));
}

#[test]
fn errors_round_trip_json() {
    let err = LensError::Injection(sample_info("already-injected", "second injection"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Injection\""));
    let decoded: LensError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
