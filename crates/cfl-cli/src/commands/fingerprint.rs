use std::error::Error;
use std::path::PathBuf;

use cfl_core::serde::to_canonical_json_bytes;
use cfl_core::{canonicalize, fingerprint, ExperimentRecord, Fingerprint};
use cfl_store::ResultStore;
use clap::Args;
use serde::Serialize;

use super::RecordArgs;

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    #[command(flatten)]
    pub record: RecordArgs,
    /// Also report whether the result store already holds this run.
    #[arg(long)]
    pub results: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Identity {
    output_name: String,
    fingerprint: Fingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    existing: Option<String>,
}

pub fn run(args: &FingerprintArgs) -> Result<(), Box<dyn Error>> {
    let record = ExperimentRecord::from(args.record.clone());
    let output_name = canonicalize(&record);
    let id = fingerprint(&output_name);
    let existing = args
        .results
        .as_ref()
        .and_then(|root| ResultStore::new(root).find_duplicate(&id));
    let identity = Identity {
        output_name,
        fingerprint: id,
        existing,
    };
    let json = to_canonical_json_bytes(&identity)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
