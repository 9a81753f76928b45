use std::fs;
use std::path::{Path, PathBuf};

use cfl_core::errors::{CflError, ErrorInfo};
use cfl_core::serde::from_yaml_slice;
use serde::{Deserialize, Serialize};

/// Datasets the default builder knows how to partition.
pub const DEFAULT_DATASETS: [&str; 4] = ["mnist", "cifar10", "fashion-mnist", "kmnist"];

/// Driver configuration, typically read from a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Root of the result store.
    pub results_root: PathBuf,
    /// Extension of result artifacts.
    pub suffix: String,
    /// Take a per-fingerprint claim before building.
    pub claims: bool,
    /// Datasets accepted by the default builder.
    pub datasets: Vec<String>,
    /// Default tracing filter directive.
    pub log_filter: String,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from("results"),
            suffix: cfl_store::RESULT_SUFFIX.to_string(),
            claims: true,
            datasets: DEFAULT_DATASETS.iter().map(|name| name.to_string()).collect(),
            log_filter: "info".to_string(),
        }
    }
}

/// Loads settings from a YAML file. Relative result roots resolve against the file's directory.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<LaunchSettings, CflError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        CflError::Config(
            ErrorInfo::new("settings_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let mut settings: LaunchSettings = from_yaml_slice(&bytes)?;
    if settings.results_root.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        settings.results_root = base.join(&settings.results_root);
    }
    if settings.suffix.trim_start_matches('.').is_empty() {
        return Err(CflError::Config(
            ErrorInfo::new("settings_suffix", "artifact suffix must not be empty")
                .with_context("path", path.display().to_string()),
        ));
    }
    Ok(settings)
}
