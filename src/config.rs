//! Optional TOML configuration
//!
//! Every field has a default, so a config file only needs the keys it changes.
//! Command-line flags override whatever the file sets.

use crate::metrics::DEFAULT_STATS_WINDOW_SECONDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Event cap per file before sampling (0 = no limit)
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Bin width in seconds for event-rate charts
    #[serde(default = "default_bin_seconds")]
    pub bin_seconds: f64,

    /// Dataset labels for comparison mode
    #[serde(default = "default_labels")]
    pub labels: [String; 2],

    /// Window width in seconds for the statistics table
    #[serde(default = "default_stats_window")]
    pub stats_window_seconds: f64,
}

fn default_max_events() -> usize {
    50_000
}

fn default_bin_seconds() -> f64 {
    0.5
}

fn default_labels() -> [String; 2] {
    ["Light Load".to_string(), "Heavy Load".to_string()]
}

fn default_stats_window() -> f64 {
    DEFAULT_STATS_WINDOW_SECONDS
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
            bin_seconds: default_bin_seconds(),
            labels: default_labels(),
            stats_window_seconds: default_stats_window(),
        }
    }
}

impl VisualizerConfig {
    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, otherwise the built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Event cap as the loader expects it (`None` = unlimited)
    pub fn event_cap(&self) -> Option<usize> {
        (self.max_events > 0).then_some(self.max_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = VisualizerConfig::default();
        assert_eq!(config.max_events, 50_000);
        assert_eq!(config.bin_seconds, 0.5);
        assert_eq!(config.labels[0], "Light Load");
        assert_eq!(config.labels[1], "Heavy Load");
        assert_eq!(config.stats_window_seconds, 60.0);
        assert_eq!(config.event_cap(), Some(50_000));
    }

    #[test]
    fn test_config_partial_toml() {
        let config: VisualizerConfig = toml::from_str("max_events = 0\n").unwrap();
        assert_eq!(config.max_events, 0);
        assert_eq!(config.event_cap(), None);
        assert_eq!(config.bin_seconds, 0.5);
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
max_events = 1000
bin_seconds = 2.0
labels = ["ext4", "xfs"]
stats_window_seconds = 30.0
"#;
        let config: VisualizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_events, 1000);
        assert_eq!(config.bin_seconds, 2.0);
        assert_eq!(config.labels, ["ext4".to_string(), "xfs".to_string()]);
        assert_eq!(config.stats_window_seconds, 30.0);
    }

    #[test]
    fn test_config_from_file_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            VisualizerConfig::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "max_events = \"lots\"").unwrap();
        assert!(matches!(
            VisualizerConfig::from_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_config_load_without_path() {
        assert_eq!(
            VisualizerConfig::load(None).unwrap(),
            VisualizerConfig::default()
        );
    }
}
