use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use cfl_core::errors::{CflError, ErrorInfo};
use cfl_core::Fingerprint;
use tracing::warn;

use crate::scanner::ResultStore;

const CLAIM_DIR: &str = ".claims";
const CLAIM_SUFFIX: &str = "claim";

/// Exclusive hold on a fingerprint for the lifetime of one invocation.
///
/// The marker file is removed when the guard is dropped.
#[derive(Debug)]
pub struct ClaimGuard {
    path: PathBuf,
}

impl ClaimGuard {
    /// Location of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %err, "failed to release claim");
            }
        }
    }
}

impl ResultStore {
    /// Path of the claim marker for `id`.
    pub fn claim_path(&self, id: &Fingerprint) -> PathBuf {
        self.root()
            .join(CLAIM_DIR)
            .join(format!("{}.{CLAIM_SUFFIX}", id.as_str()))
    }

    /// Atomically claims `id`.
    ///
    /// Returns `Ok(None)` when another invocation already holds the claim.
    pub fn claim(&self, id: &Fingerprint, output_name: &str) -> Result<Option<ClaimGuard>, CflError> {
        let path = self.claim_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| claim_error("claim-dir", &path, err))?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(err) => return Err(claim_error("claim-create", &path, err)),
        };
        let guard = ClaimGuard { path };
        writeln!(file, "{output_name}").map_err(|err| claim_error("claim-write", guard.path(), err))?;
        Ok(Some(guard))
    }
}

fn claim_error(code: &str, path: &Path, err: std::io::Error) -> CflError {
    CflError::Store(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}
