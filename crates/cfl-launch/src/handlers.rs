use std::collections::BTreeMap;

use cfl_core::errors::CflError;
use cfl_core::{ExpKind, ExperimentRecord};
use cfl_store::{write_artifact, ArtifactReceipt, ResultArtifact, ResultStore};
use serde_json::json;

use crate::builder::{ClientSpec, ServerModel};

/// Execution modes the dispatch controller can route to.
///
/// Each handler is responsible for persisting a result artifact named after
/// `output_name` and returning the receipt for it.
pub trait ExecutionHandlers<S, C> {
    /// Runs the centralized and federated baselines.
    fn run_benchmark(
        &mut self,
        clients: Vec<C>,
        record: &ExperimentRecord,
        output_name: &str,
        server: S,
    ) -> Result<ArtifactReceipt, CflError>;

    /// Runs clustered federated learning with client-side cluster selection.
    fn run_client_side(
        &mut self,
        server: S,
        clients: Vec<C>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError>;

    /// Runs clustered federated learning with server-side clustering.
    fn run_server_side(
        &mut self,
        server: S,
        clients: Vec<C>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError>;
}

/// Handlers that record the resolved run plan as the result artifact.
///
/// Training itself happens elsewhere; these handlers keep the naming contract
/// so later invocations see the run as complete.
#[derive(Debug, Clone)]
pub struct SummaryHandlers {
    store: ResultStore,
}

impl SummaryHandlers {
    /// Creates handlers writing into `store`.
    pub fn new(store: ResultStore) -> Self {
        Self { store }
    }

    fn persist(
        &self,
        mode: ExpKind,
        server: &ServerModel,
        clients: &[ClientSpec],
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError> {
        let mut cluster_sizes: BTreeMap<u64, u64> = BTreeMap::new();
        for client in clients {
            *cluster_sizes.entry(client.cluster).or_default() += 1;
        }
        let summary = json!({
            "server": server,
            "num_clients": clients.len(),
            "cluster_sizes": cluster_sizes,
            "centralized_epochs": record.centralized_epochs,
            "federated_rounds": record.federated_rounds,
        });
        let artifact = ResultArtifact::new(record, mode, output_name, summary)?;
        write_artifact(&self.store, output_name, &artifact)
    }
}

impl ExecutionHandlers<ServerModel, ClientSpec> for SummaryHandlers {
    fn run_benchmark(
        &mut self,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
        server: ServerModel,
    ) -> Result<ArtifactReceipt, CflError> {
        self.persist(ExpKind::Benchmark, &server, &clients, record, output_name)
    }

    fn run_client_side(
        &mut self,
        server: ServerModel,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError> {
        self.persist(ExpKind::Client, &server, &clients, record, output_name)
    }

    fn run_server_side(
        &mut self,
        server: ServerModel,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError> {
        self.persist(ExpKind::Server, &server, &clients, record, output_name)
    }
}
