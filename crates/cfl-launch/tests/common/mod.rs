#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use cfl_core::errors::CflError;
use cfl_core::{ExpKind, ExperimentRecord};
use cfl_launch::{ClientSpec, ExecutionHandlers, ExperimentBuilder, ServerModel, SummaryHandlers};
use cfl_store::{ArtifactReceipt, ResultStore};

pub fn scenario() -> ExperimentRecord {
    ExperimentRecord {
        exp_type: Some("benchmark".into()),
        dataset: Some("mnist".into()),
        heterogeneity_type: Some("label_skew".into()),
        num_clients: Some(5),
        num_samples_by_label: Some(10),
        num_clusters: Some(3),
        centralized_epochs: Some(0),
        federated_rounds: Some(20),
        seed: Some(42),
    }
}

/// One observed handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: ExpKind,
    pub output_name: String,
    pub num_clients: usize,
    pub dataset: String,
}

/// Summary handlers that also remember every invocation.
pub struct Recording {
    inner: SummaryHandlers,
    pub calls: Vec<Call>,
}

impl Recording {
    pub fn new(store: ResultStore) -> Self {
        Self {
            inner: SummaryHandlers::new(store),
            calls: Vec::new(),
        }
    }

    fn note(&mut self, kind: ExpKind, server: &ServerModel, clients: &[ClientSpec], output_name: &str) {
        self.calls.push(Call {
            kind,
            output_name: output_name.to_string(),
            num_clients: clients.len(),
            dataset: server.dataset.clone(),
        });
    }
}

impl ExecutionHandlers<ServerModel, ClientSpec> for Recording {
    fn run_benchmark(
        &mut self,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
        server: ServerModel,
    ) -> Result<ArtifactReceipt, CflError> {
        self.note(ExpKind::Benchmark, &server, &clients, output_name);
        self.inner.run_benchmark(clients, record, output_name, server)
    }

    fn run_client_side(
        &mut self,
        server: ServerModel,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError> {
        self.note(ExpKind::Client, &server, &clients, output_name);
        self.inner.run_client_side(server, clients, record, output_name)
    }

    fn run_server_side(
        &mut self,
        server: ServerModel,
        clients: Vec<ClientSpec>,
        record: &ExperimentRecord,
        output_name: &str,
    ) -> Result<ArtifactReceipt, CflError> {
        self.note(ExpKind::Server, &server, &clients, output_name);
        self.inner.run_server_side(server, clients, record, output_name)
    }
}

/// Builder that always fails, as when a dataset cannot be fetched.
pub struct Unreachable;

impl ExperimentBuilder for Unreachable {
    type Server = ServerModel;
    type Client = ClientSpec;

    fn build(&self, _record: &ExperimentRecord) -> Result<(ServerModel, Vec<ClientSpec>), CflError> {
        Err(CflError::build("dataset-fetch", "connection reset while downloading mnist"))
    }
}

/// Shared in-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a plain-text fmt subscriber and returns what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().map(|bytes| bytes.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
