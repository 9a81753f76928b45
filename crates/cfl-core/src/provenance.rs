//! Provenance stamped into every result artifact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hash::Fingerprint;

/// Identity and origin of a persisted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProvenance {
    /// Canonical output name; equals the artifact stem.
    pub output_name: String,
    /// Fingerprint of `output_name`.
    pub fingerprint: Fingerprint,
    /// Hash of the canonical JSON rendering of the record.
    pub record_hash: String,
    /// Master seed, when the record carried one.
    pub seed: Option<i64>,
    /// RFC 3339 timestamp recording when the artifact was generated.
    pub created_at: String,
    /// Version map for the tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
