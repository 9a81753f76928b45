#![deny(missing_docs)]
#![doc = "Result store access for the cfl experiment driver."]

/// Result artifact layout and persistence.
pub mod artifact;
/// Atomic per-fingerprint claim markers.
pub mod claim;
/// Duplicate detection over persisted artifacts.
pub mod scanner;

pub use artifact::{read_artifact, write_artifact, ArtifactReceipt, ResultArtifact};
pub use claim::ClaimGuard;
pub use scanner::{find_duplicate, ResultStore, RESULT_SUFFIX};
