//! Simulation run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file can not be read.
    #[error("can't read config file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Config file is not a valid YAML config.
    #[error("can't parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn default_name() -> String {
    "gps".to_string()
}

fn default_true() -> bool {
    true
}

/// Options of a simulation run. Missing YAML fields take default values.
///
/// ```yaml
/// name: gps
/// drain_trailing_departures: true
/// output: results.json
/// print_trace: false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Engine name used in log messages.
    #[serde(default = "default_name")]
    pub name: String,
    /// Process departures scheduled after the last packet arrival.
    #[serde(default)]
    pub drain_trailing_departures: bool,
    /// Path of the JSON results file.
    #[serde(default)]
    pub output: Option<String>,
    /// Print flows and packets before running the simulation.
    #[serde(default = "default_true")]
    pub print_trace: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            drain_trailing_departures: false,
            output: None,
            print_trace: true,
        }
    }
}

impl RunConfig {
    /// Reads config from the YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parses config from the YAML string.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Enables or disables processing of departures after the last arrival.
    pub fn with_drain(mut self, drain: bool) -> Self {
        self.drain_trailing_departures = drain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml() {
        let config = RunConfig::from_yaml("drain_trailing_departures: true\n").unwrap();
        assert_eq!(config, RunConfig::default().with_drain(true));
    }

    #[test]
    fn full_yaml() {
        let config =
            RunConfig::from_yaml("name: wfq\ndrain_trailing_departures: false\noutput: out.json\nprint_trace: false\n")
                .unwrap();
        assert_eq!(config.name, "wfq");
        assert_eq!(config.output.as_deref(), Some("out.json"));
        assert!(!config.print_trace);
    }

    #[test]
    fn bad_yaml() {
        assert!(matches!(
            RunConfig::from_yaml("drain_trailing_departures: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
