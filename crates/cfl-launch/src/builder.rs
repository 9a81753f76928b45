use cfl_core::errors::{CflError, ErrorInfo};
use cfl_core::{derive_substream_seed, ExperimentRecord, RngHandle};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_DATASETS;

/// Largest client population the default setup will materialise.
pub const MAX_CLIENTS: u64 = 100_000;

/// Constructs the runnable server model and clients for a record.
pub trait ExperimentBuilder {
    /// Server-side model handed to the execution handler.
    type Server;
    /// Per-client state handed to the execution handler.
    type Client;

    /// Builds the experiment, failing with a human readable cause.
    fn build(
        &self,
        record: &ExperimentRecord,
    ) -> Result<(Self::Server, Vec<Self::Client>), CflError>;
}

/// Global model description shared by every execution mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerModel {
    /// Dataset the model is trained on.
    pub dataset: String,
    /// Heterogeneity profile of the client partition.
    pub heterogeneity_type: String,
    /// Number of cluster models maintained by clustered runs.
    pub num_clusters: u64,
    /// Seed used to initialise the model weights.
    pub init_seed: u64,
}

/// A single federated client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSpec {
    /// Zero based client index.
    pub id: u64,
    /// Ground-truth cluster the client's data was drawn for.
    pub cluster: u64,
    /// Seed driving the client's sampling and local training.
    pub seed: u64,
    /// Number of local samples per label.
    pub samples_by_label: u64,
}

/// Default builder partitioning a known dataset across seeded clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedSetup {
    datasets: Vec<String>,
}

impl Default for FederatedSetup {
    fn default() -> Self {
        Self::new(DEFAULT_DATASETS.iter().map(|name| name.to_string()))
    }
}

impl FederatedSetup {
    /// Creates a builder accepting the given dataset identifiers.
    pub fn new(datasets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            datasets: datasets.into_iter().map(Into::into).collect(),
        }
    }
}

fn missing(field: &str) -> CflError {
    CflError::Build(
        ErrorInfo::new("missing-field", format!("{field} is required"))
            .with_context("field", field),
    )
}

fn non_positive(field: &str) -> CflError {
    CflError::Build(
        ErrorInfo::new("non-positive-field", format!("{field} must be greater than zero"))
            .with_context("field", field),
    )
}

impl ExperimentBuilder for FederatedSetup {
    type Server = ServerModel;
    type Client = ClientSpec;

    fn build(&self, record: &ExperimentRecord) -> Result<(ServerModel, Vec<ClientSpec>), CflError> {
        let dataset = record.dataset.as_deref().ok_or_else(|| missing("dataset"))?;
        if !self.datasets.iter().any(|known| known == dataset) {
            return Err(CflError::Build(
                ErrorInfo::new("unknown-dataset", format!("dataset {dataset} is not supported"))
                    .with_context("dataset", dataset)
                    .with_hint(format!("supported datasets: {}", self.datasets.join(", "))),
            ));
        }
        let heterogeneity_type = record
            .heterogeneity_type
            .as_deref()
            .ok_or_else(|| missing("heterogeneity_type"))?;
        let num_clients = record.num_clients.ok_or_else(|| missing("num_clients"))?;
        if num_clients == 0 {
            return Err(non_positive("num_clients"));
        }
        if num_clients > MAX_CLIENTS {
            return Err(CflError::Build(
                ErrorInfo::new(
                    "too-many-clients",
                    format!("num_clients {num_clients} exceeds the limit of {MAX_CLIENTS}"),
                )
                .with_context("field", "num_clients"),
            ));
        }
        let samples_by_label = record
            .num_samples_by_label
            .ok_or_else(|| missing("num_samples_by_label"))?;
        if samples_by_label == 0 {
            return Err(non_positive("num_samples_by_label"));
        }
        let seed = record.seed.ok_or_else(|| missing("seed"))?;
        let num_clusters = record.num_clusters.unwrap_or(1).max(1);
        if num_clusters > num_clients {
            return Err(CflError::Build(
                ErrorInfo::new(
                    "too-many-clusters",
                    format!("num_clusters {num_clusters} exceeds num_clients {num_clients}"),
                )
                .with_context("field", "num_clusters"),
            ));
        }

        // Balanced cluster labels, shuffled so cluster membership does not follow client order.
        let mut clusters: Vec<u64> = (0..num_clients).map(|id| id % num_clusters).collect();
        let mut rng = RngHandle::from_record_seed(seed);
        clusters.shuffle(&mut rng);

        let master = seed as u64;
        let clients = clusters
            .into_iter()
            .enumerate()
            .map(|(id, cluster)| ClientSpec {
                id: id as u64,
                cluster,
                seed: derive_substream_seed(master, id as u64 + 1),
                samples_by_label,
            })
            .collect();
        let server = ServerModel {
            dataset: dataset.to_string(),
            heterogeneity_type: heterogeneity_type.to_string(),
            num_clusters,
            init_seed: derive_substream_seed(master, 0),
        };
        Ok((server, clients))
    }
}
