use std::fs;
use std::path::{Path, PathBuf};

use glens_core::errors::{ErrorInfo, LensError};
use indexmap::IndexMap;
use toml::Value;

use crate::value;

/// One named section of the run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    entries: IndexMap<String, Value>,
}

impl Section {
    /// Section name as written in the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over `(key, raw value)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of keys in the section.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw value for `key`, if present.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn require(&self, key: &str) -> Result<&Value, LensError> {
        self.entries.get(key).ok_or_else(|| {
            LensError::MissingKey(
                ErrorInfo::new("missing-key", "required key is absent")
                    .with_context("section", self.name.clone())
                    .with_context("key", key),
            )
        })
    }

    /// Text form of `key`.
    pub fn get_str(&self, key: &str) -> Result<String, LensError> {
        value::as_text(&self.name, key, self.require(key)?)
    }

    /// `key` coerced to a float.
    pub fn get_float(&self, key: &str) -> Result<f64, LensError> {
        value::as_float(&self.name, key, self.require(key)?)
    }

    /// `key` coerced to an integer.
    pub fn get_int(&self, key: &str) -> Result<i64, LensError> {
        value::as_int(&self.name, key, self.require(key)?)
    }

    /// `key` coerced to a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, LensError> {
        value::as_bool(&self.name, key, self.require(key)?)
    }

    /// `key` coerced to an ordered list of strings.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, LensError> {
        value::as_list(&self.name, key, self.require(key)?)
    }

    /// Text form of `key`, or `None` when absent.
    pub fn opt_str(&self, key: &str) -> Result<Option<String>, LensError> {
        self.raw(key)
            .map(|raw| value::as_text(&self.name, key, raw))
            .transpose()
    }

    /// Float form of `key`, or `None` when absent.
    pub fn opt_float(&self, key: &str) -> Result<Option<f64>, LensError> {
        self.raw(key)
            .map(|raw| value::as_float(&self.name, key, raw))
            .transpose()
    }

    /// Integer form of `key`, or `None` when absent.
    pub fn opt_int(&self, key: &str) -> Result<Option<i64>, LensError> {
        self.raw(key)
            .map(|raw| value::as_int(&self.name, key, raw))
            .transpose()
    }
}

/// Immutable run configuration grouped by section.
///
/// Loaded once per process. Every section is a flat key/value table; nested
/// tables are rejected at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    source: Option<PathBuf>,
    sections: IndexMap<String, Section>,
}

impl RunConfiguration {
    /// Loads the configuration stored at `path`.
    ///
    /// Fails with [`LensError::ConfigMissing`] when `path` is not a readable file
    /// and with [`LensError::ConfigParse`] when the content cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, LensError> {
        if !path.is_file() {
            return Err(LensError::ConfigMissing(
                ErrorInfo::new("config-missing", "configuration path is not a file")
                    .with_context("path", path.display().to_string())
                    .with_hint("pass the path of an existing configuration file"),
            ));
        }
        Self::read(path)
    }

    /// Reads and parses `path`. Parse failures always propagate.
    pub fn read(path: &Path) -> Result<Self, LensError> {
        let bytes = fs::read(path).map_err(|err| {
            LensError::ConfigMissing(
                ErrorInfo::new("config-unreadable", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let contents = String::from_utf8(bytes).map_err(|err| {
            LensError::ConfigParse(
                ErrorInfo::new("config-encoding", "configuration is not valid UTF-8")
                    .with_context("path", path.display().to_string())
                    .with_context("valid_up_to", err.utf8_error().valid_up_to().to_string()),
            )
        })?;
        let mut config = Self::parse(&contents).map_err(|err| match err {
            LensError::ConfigParse(info) => {
                LensError::ConfigParse(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration text.
    pub fn parse(contents: &str) -> Result<Self, LensError> {
        let table: toml::Table = contents.parse().map_err(|err: toml::de::Error| {
            LensError::ConfigParse(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        let mut sections = IndexMap::new();
        for (name, body) in table {
            let Value::Table(body) = body else {
                return Err(LensError::ConfigParse(
                    ErrorInfo::new("config-entry-outside-section", "keys must belong to a section")
                        .with_context("key", name),
                ));
            };
            let mut entries = IndexMap::new();
            for (key, value) in body {
                if value.is_table() {
                    return Err(LensError::ConfigParse(
                        ErrorInfo::new("config-nested-section", "sections cannot be nested")
                            .with_context("section", name.clone())
                            .with_context("key", key),
                    ));
                }
                entries.insert(key, value);
            }
            sections.insert(name.clone(), Section { name, entries });
        }
        Ok(Self {
            source: None,
            sections,
        })
    }

    /// File the configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether `name` is present.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Returns the section `name` or a [`LensError::MissingKey`] naming it.
    pub fn section(&self, name: &str) -> Result<&Section, LensError> {
        self.sections.get(name).ok_or_else(|| {
            LensError::MissingKey(
                ErrorInfo::new("missing-section", "required section is absent")
                    .with_context("section", name),
            )
        })
    }

    /// Text form of `section.key`.
    pub fn get_str(&self, section: &str, key: &str) -> Result<String, LensError> {
        self.section(section)?.get_str(key)
    }

    /// `section.key` coerced to a float.
    pub fn get_float(&self, section: &str, key: &str) -> Result<f64, LensError> {
        self.section(section)?.get_float(key)
    }

    /// `section.key` coerced to an integer.
    pub fn get_int(&self, section: &str, key: &str) -> Result<i64, LensError> {
        self.section(section)?.get_int(key)
    }

    /// `section.key` coerced to a boolean.
    pub fn get_bool(&self, section: &str, key: &str) -> Result<bool, LensError> {
        self.section(section)?.get_bool(key)
    }

    /// `section.key` coerced to an ordered list.
    pub fn get_list(&self, section: &str, key: &str) -> Result<Vec<String>, LensError> {
        self.section(section)?.get_list(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[bilby_setup]
label = "run"
duration = "4"
sampling_frequency = 2048
plot_corner = "yes"
detectors = "H1, L1"

[sampler_kwargs]
nlive = 100
"#;

    #[test]
    fn typed_getters_coerce_text_values() {
        let config = RunConfiguration::parse(SAMPLE).unwrap();
        assert_eq!(config.get_str("bilby_setup", "label").unwrap(), "run");
        assert_eq!(config.get_float("bilby_setup", "duration").unwrap(), 4.0);
        assert_eq!(
            config.get_float("bilby_setup", "sampling_frequency").unwrap(),
            2048.0
        );
        assert!(config.get_bool("bilby_setup", "plot_corner").unwrap());
        assert_eq!(
            config.get_list("bilby_setup", "detectors").unwrap(),
            vec!["H1", "L1"]
        );
        assert_eq!(config.get_int("sampler_kwargs", "nlive").unwrap(), 100);
    }

    #[test]
    fn missing_section_and_key_are_distinguished() {
        let config = RunConfiguration::parse(SAMPLE).unwrap();
        let err = config.get_str("prior_settings", "prior_file").unwrap_err();
        assert_eq!(err.info().code, "missing-section");
        let err = config.get_str("bilby_setup", "outdir").unwrap_err();
        assert!(matches!(err, LensError::MissingKey(_)));
        assert_eq!(err.info().context["key"], "outdir");
    }

    #[test]
    fn keys_outside_sections_are_rejected() {
        let err = RunConfiguration::parse("label = \"run\"\n").unwrap_err();
        assert_eq!(err.info().code, "config-entry-outside-section");
    }

    #[test]
    fn nested_tables_are_rejected() {
        let err = RunConfiguration::parse("[a]\n[a.b]\nc = 1\n").unwrap_err();
        assert_eq!(err.info().code, "config-nested-section");
    }

    #[test]
    fn section_entries_keep_file_order() {
        let config = RunConfiguration::parse("[s]\nz = 1\na = 2\nm = 3\n").unwrap();
        let keys: Vec<_> = config.section("s").unwrap().entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
