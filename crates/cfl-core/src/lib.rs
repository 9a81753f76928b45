#![deny(missing_docs)]
#![doc = "Experiment records, canonical output names and fingerprints shared by the cfl crates."]

pub mod canonical;
pub mod errors;
pub mod hash;
pub mod provenance;
pub mod record;
pub mod rng;
pub mod serde;

pub use canonical::{canonicalize, flatten, MISSING_TOKEN, PATH_REPLACEMENT, VALUE_SEPARATOR};
pub use errors::{CflError, ErrorInfo};
pub use hash::{fingerprint, stable_hash_string, Fingerprint};
pub use provenance::RunProvenance;
pub use record::{ExpKind, ExperimentRecord, FieldValue, FIELD_ORDER};
pub use rng::{derive_substream_seed, RngHandle};
