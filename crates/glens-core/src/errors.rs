//! Structured error types shared across glens crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LensError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, sections, parameter names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the glens pipeline.
///
/// Every variant is fatal to a run. Callers propagate with `?` and the binary
/// surfaces the error on exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LensError {
    /// The configuration path does not name a readable file.
    #[error("configuration missing: {0}")]
    ConfigMissing(ErrorInfo),
    /// The configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(ErrorInfo),
    /// A required section or key is absent.
    #[error("missing key: {0}")]
    MissingKey(ErrorInfo),
    /// A value could not be coerced to the requested type.
    #[error("value conversion error: {0}")]
    ValueConversion(ErrorInfo),
    /// A generator class, source model or sampler identifier is not registered.
    #[error("unknown model: {0}")]
    UnknownModel(ErrorInfo),
    /// A detector name is not known to the simulator.
    #[error("unknown detector: {0}")]
    UnknownDetector(ErrorInfo),
    /// The prior file is unreadable or malformed.
    #[error("prior file error: {0}")]
    PriorFile(ErrorInfo),
    /// A parameter is known to neither the priors nor the injection parameters.
    #[error("unknown parameter: {0}")]
    UnknownParameter(ErrorInfo),
    /// The sampling engine failed.
    #[error("sampler error: {0}")]
    Sampler(ErrorInfo),
    /// Misuse of the detector network (double injection, unset strain, mutated data).
    #[error("injection error: {0}")]
    Injection(ErrorInfo),
    /// Amplification data could not be produced or read.
    #[error("amplification error: {0}")]
    Amplification(ErrorInfo),
    /// Filesystem side effects failed.
    #[error("output error: {0}")]
    Output(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl LensError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LensError::ConfigMissing(info)
            | LensError::ConfigParse(info)
            | LensError::MissingKey(info)
            | LensError::ValueConversion(info)
            | LensError::UnknownModel(info)
            | LensError::UnknownDetector(info)
            | LensError::PriorFile(info)
            | LensError::UnknownParameter(info)
            | LensError::Sampler(info)
            | LensError::Injection(info)
            | LensError::Amplification(info)
            | LensError::Output(info) => info,
        }
    }

    /// Wraps an I/O failure on `path` as an [`LensError::Output`].
    pub fn output(code: &str, path: &std::path::Path, err: impl Display) -> Self {
        LensError::Output(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
