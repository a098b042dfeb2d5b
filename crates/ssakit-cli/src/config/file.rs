use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileEnsembleConfig {
    pub runs: Option<usize>,
    #[serde(rename = "grid-points")]
    pub grid_points: Option<usize>,
    #[serde(rename = "snapshot-times")]
    pub snapshot_times: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileValidationConfig {
    #[serde(rename = "ode-step")]
    pub ode_step: Option<f64>,
    #[serde(rename = "steady-state-tolerance")]
    pub steady_state_tolerance: Option<f64>,
    #[serde(rename = "steady-state-max-time")]
    pub steady_state_max_time: Option<f64>,
}

/// The run file as written on disk; every field is optional until merged.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<PathBuf>,
    #[serde(rename = "t-max")]
    pub t_max: Option<f64>,
    #[serde(rename = "max-steps")]
    pub max_steps: Option<u64>,
    pub seed: Option<u64>,
    #[serde(rename = "record-events")]
    pub record_events: Option<bool>,
    #[serde(rename = "initial-counts", default)]
    pub initial_counts: BTreeMap<String, u64>,
    pub ensemble: Option<FileEnsembleConfig>,
    pub validation: Option<FileValidationConfig>,
}

impl FileConfig {
    /// Parses a run file; a relative `network` path is taken relative to the file itself.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        if let (Some(network), Some(dir)) = (&config.network, path.parent()) {
            if network.is_relative() {
                config.network = Some(dir.join(network));
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_full_run_file_and_resolves_network_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
network = "nets/binding.toml"
t-max = 25.0
max-steps = 1000
seed = 7
record-events = true

[initial-counts]
A = 50
B = 30
AB = 20

[ensemble]
runs = 16
grid-points = 11
snapshot-times = [0.0, 1.0]

[validation]
ode-step = 0.01
"#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.network, Some(dir.path().join("nets/binding.toml")));
        assert_eq!(config.t_max, Some(25.0));
        assert_eq!(config.max_steps, Some(1000));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.record_events, Some(true));
        assert_eq!(config.initial_counts.get("AB"), Some(&20));
        let ensemble = config.ensemble.unwrap();
        assert_eq!(ensemble.runs, Some(16));
        assert_eq!(ensemble.snapshot_times, Some(vec![0.0, 1.0]));
        assert_eq!(config.validation.unwrap().ode_step, Some(0.01));
    }

    #[test]
    fn absolute_network_path_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "network = \"/data/net.toml\"\n").unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.network, Some(PathBuf::from("/data/net.toml")));
    }

    #[test]
    fn unknown_keys_are_reported_with_the_file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "t-max = 1.0\nduration = 5.0\n").unwrap();

        match FileConfig::from_file(&path) {
            Err(CliError::FileParsing { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected FileParsing error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
