//! Session configuration

use crate::ingest::DatasetSchema;
use crate::render::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for this schema
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range or malformed
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one graph session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base IRI of every entity, predicate and class
    pub namespace: String,
    /// Prefix bound to `namespace`; the `:` query shorthand expands to it
    pub prefix: String,
    /// Arrest reports endpoint, without extension
    pub arrest_reports_url: String,
    /// Crime reports endpoint, without extension
    pub crime_reports_url: String,
    /// Maximum rows downloaded per dataset
    pub dataset_size: usize,
    /// RDF/XML file the graph is loaded from and exported to
    pub destination: PathBuf,
    /// Result rows per page
    pub page_size: usize,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: "https://data.lacity.org/".to_string(),
            prefix: "ns1".to_string(),
            arrest_reports_url: "https://data.lacity.org/resource/amvf-fr72".to_string(),
            crime_reports_url: "https://data.lacity.org/resource/2nrs-mtv8".to_string(),
            dataset_size: 99_999_999,
            destination: PathBuf::from("output.rdf"),
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout_secs: 60,
        }
    }
}

impl SessionConfig {
    /// Load from a YAML file; missing keys take their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.namespace.starts_with("http://") || self.namespace.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "namespace must be an http(s) IRI: {}",
                self.namespace
            )));
        }

        if !self.namespace.ends_with('/') && !self.namespace.ends_with('#') {
            return Err(ConfigError::Invalid(format!(
                "namespace must end with '/' or '#': {}",
                self.namespace
            )));
        }

        if self.prefix.is_empty() || self.prefix.contains(':') || self.prefix.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!("invalid prefix: '{}'", self.prefix)));
        }

        Ok(())
    }

    /// IRI prefix of context graph names
    pub fn context_base(&self) -> String {
        format!("{}context/", self.namespace)
    }

    /// Endpoint of a built-in dataset
    pub fn dataset_url(&self, schema: &DatasetSchema) -> &str {
        if schema.name == crate::ingest::CRIME_REPORTS.name {
            &self.crime_reports_url
        } else {
            &self.arrest_reports_url
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ARREST_REPORTS, CRIME_REPORTS};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.prefix, "ns1");
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.context_base(), "https://data.lacity.org/context/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SessionConfig::from_yaml_str("dataset_size: 500\npage_size: 50\n").unwrap();
        assert_eq!(config.dataset_size, 500);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.namespace, "https://data.lacity.org/");
    }

    #[test]
    fn test_dataset_urls() {
        let config = SessionConfig::default();
        assert!(config.dataset_url(&ARREST_REPORTS).ends_with("amvf-fr72"));
        assert!(config.dataset_url(&CRIME_REPORTS).ends_with("2nrs-mtv8"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            SessionConfig::from_yaml_str("namespace: data.lacity.org\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_yaml_str("prefix: 'ns 1'\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_yaml_str("page_size: lots\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "destination: graph.rdf").unwrap();

        let config = SessionConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.destination, PathBuf::from("graph.rdf"));
        assert!(SessionConfig::from_yaml_file("/nonexistent/config.yaml").is_err());
    }
}
