pub mod fingerprint;
pub mod run;
pub mod version;

use cfl_core::ExperimentRecord;
use clap::Args;

/// Experiment parameters shared by every record-taking subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// The experiment type to run (benchmark, client or server).
    #[arg(long, alias = "exp_type")]
    pub exp_type: Option<String>,
    /// Dataset identifier.
    #[arg(long)]
    pub dataset: Option<String>,
    /// The data heterogeneity to test.
    #[arg(long, alias = "heterogeneity_type")]
    pub heterogeneity_type: Option<String>,
    /// Number of federated clients.
    #[arg(long, alias = "num_clients")]
    pub num_clients: Option<u64>,
    /// Samples drawn per label for each client.
    #[arg(long, alias = "num_samples_by_label")]
    pub num_samples_by_label: Option<u64>,
    /// Number of ground-truth clusters.
    #[arg(long, alias = "num_clusters")]
    pub num_clusters: Option<u64>,
    /// Centralized training epochs.
    #[arg(long, alias = "centralized_epochs")]
    pub centralized_epochs: Option<u64>,
    /// Federated training rounds.
    #[arg(long, alias = "federated_rounds")]
    pub federated_rounds: Option<u64>,
    /// Master seed.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,
}

impl From<RecordArgs> for ExperimentRecord {
    fn from(args: RecordArgs) -> Self {
        ExperimentRecord {
            exp_type: args.exp_type,
            dataset: args.dataset,
            heterogeneity_type: args.heterogeneity_type,
            num_clients: args.num_clients,
            num_samples_by_label: args.num_samples_by_label,
            num_clusters: args.num_clusters,
            centralized_epochs: args.centralized_epochs,
            federated_rounds: args.federated_rounds,
            seed: args.seed,
        }
    }
}
