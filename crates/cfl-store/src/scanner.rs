use std::path::{Path, PathBuf};

use cfl_core::{fingerprint, Fingerprint};
use tracing::debug;
use walkdir::WalkDir;

/// Extension carried by result artifacts.
pub const RESULT_SUFFIX: &str = "json";

/// Directory tree holding the result artifacts of previous runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultStore {
    root: PathBuf,
    suffix: String,
}

impl ResultStore {
    /// Opens a store rooted at `root`. The directory does not need to exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: RESULT_SUFFIX.to_string(),
        }
    }

    /// Overrides the artifact extension (without the leading dot).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix: String = suffix.into();
        self.suffix = suffix.trim_start_matches('.').to_string();
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact extension.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Path at which the artifact for `output_name` is expected.
    pub fn artifact_path(&self, output_name: &str) -> PathBuf {
        self.root.join(format!("{output_name}.{}", self.suffix))
    }

    /// Recursively lists artifact files. Unreadable entries are skipped.
    pub fn artifacts(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(false, |ext| ext == self.suffix)
            })
            .map(|entry| entry.into_path())
    }

    /// Returns the stem of the first artifact whose stem fingerprints to `target`.
    ///
    /// Stems are hashed as-is; they were produced by the canonicalizer when the
    /// artifact was written. A missing root yields `None`.
    pub fn find_duplicate(&self, target: &Fingerprint) -> Option<String> {
        let mut scanned = 0usize;
        let found = self
            .artifacts()
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .inspect(|_| scanned += 1)
            .find(|stem| &fingerprint(stem) == target);
        debug!(
            root = %self.root.display(),
            scanned,
            hit = found.is_some(),
            "scanned result store"
        );
        found
    }
}

/// Scans `store_root` for an artifact matching `target` using the default suffix.
pub fn find_duplicate(store_root: &Path, target: &Fingerprint) -> Option<String> {
    ResultStore::new(store_root).find_duplicate(target)
}
