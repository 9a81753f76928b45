use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cfl_core::errors::{CflError, ErrorInfo};
use cfl_core::serde::{from_json_slice, to_canonical_json_bytes};
use cfl_core::{fingerprint, stable_hash_string, ExpKind, ExperimentRecord, RunProvenance};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scanner::ResultStore;

fn io_error(code: &str, path: &Path, err: impl ToString) -> CflError {
    CflError::Store(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Persisted outcome of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// Identity of the run.
    pub provenance: RunProvenance,
    /// Execution mode that produced the artifact.
    pub mode: ExpKind,
    /// Parameters of the run.
    pub record: ExperimentRecord,
    /// Handler specific payload.
    #[serde(default)]
    pub summary: Value,
}

impl ResultArtifact {
    /// Stamps a new artifact for `record` under `output_name`.
    pub fn new(
        record: &ExperimentRecord,
        mode: ExpKind,
        output_name: &str,
        summary: Value,
    ) -> Result<Self, CflError> {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert("cfl-store".to_string(), env!("CARGO_PKG_VERSION").to_string());
        Ok(Self {
            provenance: RunProvenance {
                output_name: output_name.to_string(),
                fingerprint: fingerprint(output_name),
                record_hash: stable_hash_string(record)?,
                seed: record.seed,
                created_at: chrono::Utc::now().to_rfc3339(),
                tool_versions,
            },
            mode,
            record: record.clone(),
            summary,
        })
    }
}

/// Confirmation returned by an execution handler once its artifact exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReceipt {
    /// Output name the handler wrote under.
    pub output_name: String,
    /// Location of the artifact.
    pub path: PathBuf,
}

impl ArtifactReceipt {
    /// Stem of the written file, which the scanner fingerprints on later runs.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }
}

/// Writes `artifact` as canonical JSON to the store path for `output_name`.
pub fn write_artifact(
    store: &ResultStore,
    output_name: &str,
    artifact: &ResultArtifact,
) -> Result<ArtifactReceipt, CflError> {
    let path = store.artifact_path(output_name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("artifact-dir", parent, err))?;
    }
    let bytes = to_canonical_json_bytes(artifact)?;
    fs::write(&path, bytes).map_err(|err| io_error("artifact-write", &path, err))?;
    Ok(ArtifactReceipt {
        output_name: output_name.to_string(),
        path,
    })
}

/// Reads an artifact previously written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> Result<ResultArtifact, CflError> {
    let bytes = fs::read(path).map_err(|err| io_error("artifact-read", path, err))?;
    from_json_slice(&bytes)
}
