use std::error::Error;
use std::path::PathBuf;

use cfl_core::ExperimentRecord;
use cfl_launch::{
    load_settings, FederatedSetup, LaunchOpts, LaunchOutcome, LaunchSettings, Launcher,
    SummaryHandlers,
};
use cfl_store::ResultStore;
use clap::Args;
use tracing::info;

use super::RecordArgs;
use crate::logging;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub record: RecordArgs,
    /// YAML settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Result store root, overriding the settings file.
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Skip the per-fingerprint claim marker.
    #[arg(long)]
    pub no_claim: bool,
}

fn resolve_settings(args: &RunArgs) -> Result<LaunchSettings, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => LaunchSettings::default(),
    };
    if let Some(root) = &args.results {
        settings.results_root = root.clone();
    }
    if args.no_claim {
        settings.claims = false;
    }
    Ok(settings)
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let settings = resolve_settings(args)?;
    logging::configure(&settings.log_filter)?;

    let record = ExperimentRecord::from(args.record.clone());
    let store = ResultStore::new(&settings.results_root).with_suffix(settings.suffix.as_str());
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::new(settings.datasets),
        SummaryHandlers::new(store),
        LaunchOpts {
            claim: settings.claims,
        },
    );

    if let LaunchOutcome::Completed { kind, receipt } = launcher.launch(&record)? {
        info!(mode = kind.as_str(), "results written to {}", receipt.path.display());
    }
    Ok(())
}
