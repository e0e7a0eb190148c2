use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glens_core::errors::{ErrorInfo, LensError};
use glens_core::params::ParameterMap;
use glens_core::provenance::{RunProvenance, SchemaVersion};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::corner::{corner_data, CornerData};

/// Schema of `result.json`.
pub const RESULT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Result file name inside a run directory.
pub const RESULT_FILE: &str = "result.json";
/// Posterior table file name inside a run directory.
pub const POSTERIOR_FILE: &str = "posterior.csv";
/// Corner histogram file name inside a run directory.
pub const CORNER_FILE: &str = "corner.json";

/// Output of one hypothesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Schema of the serialized payload.
    pub schema: SchemaVersion,
    /// Run label (`label` or `label_unlensed`).
    pub label: String,
    /// Engine that produced the result.
    pub sampler: String,
    /// Log evidence.
    pub log_evidence: f64,
    /// Statistical error on the log evidence.
    pub log_evidence_err: f64,
    /// Log evidence of the noise-only model.
    pub log_noise_evidence: f64,
    /// `log_evidence - log_noise_evidence`.
    pub log_bayes_factor: f64,
    /// Information gain in nats.
    pub information: f64,
    /// Sampler iterations.
    pub iterations: usize,
    /// Likelihood evaluations.
    pub likelihood_evaluations: usize,
    /// Parameters explored by the sampler.
    pub search_parameters: Vec<String>,
    /// Posterior draws per parameter, fixed parameters included.
    pub posterior: IndexMap<String, Vec<f64>>,
    /// Parameters of the injected signal.
    pub injection_parameters: ParameterMap,
    /// Digest of the strain the run read.
    pub strain_digest: Option<String>,
    /// Seed and tool provenance.
    pub provenance: RunProvenance,
}

impl InferenceResult {
    /// Number of posterior draws.
    pub fn posterior_len(&self) -> usize {
        self.posterior.values().next().map_or(0, Vec::len)
    }

    /// Posterior draw `index` as a parameter map.
    pub fn draw(&self, index: usize) -> ParameterMap {
        self.posterior
            .iter()
            .filter_map(|(name, values)| values.get(index).map(|value| (name.clone(), *value)))
            .collect()
    }

    /// Writes `result.json`, `posterior.csv` and optionally `corner.json` under `dir`.
    pub fn write(&self, dir: &Path, plot_corner: bool) -> Result<Vec<PathBuf>, LensError> {
        fs::create_dir_all(dir).map_err(|err| LensError::output("result-mkdir", dir, err))?;
        let mut written = Vec::new();

        let path = dir.join(RESULT_FILE);
        write_json(&path, self)?;
        written.push(path);

        let path = dir.join(POSTERIOR_FILE);
        self.write_posterior(&path)?;
        written.push(path);

        if plot_corner {
            let draws: Vec<ParameterMap> = (0..self.posterior_len()).map(|k| self.draw(k)).collect();
            let corner: CornerData = corner_data(&draws, &self.search_parameters);
            let path = dir.join(CORNER_FILE);
            write_json(&path, &corner)?;
            written.push(path);
        }
        Ok(written)
    }

    fn write_posterior(&self, path: &Path) -> Result<(), LensError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|err| wrap_csv(path, err))?;
        wtr.write_record(self.posterior.keys())
            .map_err(|err| wrap_csv(path, err))?;
        for index in 0..self.posterior_len() {
            wtr.write_record(
                self.posterior
                    .values()
                    .map(|values| values.get(index).copied().unwrap_or(f64::NAN).to_string()),
            )
            .map_err(|err| wrap_csv(path, err))?;
        }
        wtr.flush()
            .map_err(|err| LensError::output("posterior-write", path, err))
    }

    /// Loads `result.json` from a run directory.
    pub fn load(dir: &Path) -> Result<Self, LensError> {
        let path = dir.join(RESULT_FILE);
        let contents = fs::read_to_string(&path)
            .map_err(|err| LensError::output("result-read", &path, err))?;
        serde_json::from_str(&contents).map_err(|err| LensError::output("result-parse", &path, err))
    }
}

/// Tool versions recorded in provenance.
pub fn tool_versions() -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    versions
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LensError> {
    let json = serde_json::to_string_pretty(value).map_err(|err| {
        LensError::Output(
            ErrorInfo::new("result-serialize", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    fs::write(path, json).map_err(|err| LensError::output("result-write", path, err))
}

fn wrap_csv(path: &Path, err: csv::Error) -> LensError {
    LensError::Output(
        ErrorInfo::new("posterior-write", "CSV posterior failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result() -> InferenceResult {
        let mut posterior = IndexMap::new();
        posterior.insert("chirp_mass".to_string(), vec![21.0, 21.5, 22.0]);
        posterior.insert("phase".to_string(), vec![1.3, 1.3, 1.3]);
        InferenceResult {
            schema: RESULT_SCHEMA,
            label: "unit".to_string(),
            sampler: "nested".to_string(),
            log_evidence: -10.0,
            log_evidence_err: 0.1,
            log_noise_evidence: -12.0,
            log_bayes_factor: 2.0,
            information: 1.5,
            iterations: 10,
            likelihood_evaluations: 100,
            search_parameters: vec!["chirp_mass".to_string()],
            posterior,
            injection_parameters: ParameterMap::new(),
            strain_digest: Some("ab".repeat(32)),
            provenance: RunProvenance::default(),
        }
    }

    #[test]
    fn written_result_loads_back() {
        let dir = tempdir().unwrap();
        let written = result().write(dir.path(), true).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(InferenceResult::load(dir.path()).unwrap(), result());
        let csv = fs::read_to_string(dir.path().join(POSTERIOR_FILE)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("chirp_mass,phase"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn corner_file_is_optional() {
        let dir = tempdir().unwrap();
        result().write(dir.path(), false).unwrap();
        assert!(!dir.path().join(CORNER_FILE).exists());
    }
}
