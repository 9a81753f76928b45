//! Experiment records and the closed set of experiment kinds.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CflError, ErrorInfo};

/// Declared field order of an [`ExperimentRecord`].
///
/// The order participates in the canonical output name, so reordering this
/// list invalidates every result artifact already on disk.
pub const FIELD_ORDER: [&str; 9] = [
    "exp_type",
    "dataset",
    "heterogeneity_type",
    "num_clients",
    "num_samples_by_label",
    "num_clusters",
    "centralized_epochs",
    "federated_rounds",
    "seed",
];

/// Parameters defining a single experiment run.
///
/// Every field is optional at the type level; the builder decides which
/// combinations are runnable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Experiment kind (`benchmark`, `client` or `server`).
    pub exp_type: Option<String>,
    /// Dataset identifier.
    pub dataset: Option<String>,
    /// Data heterogeneity profile applied across clients.
    pub heterogeneity_type: Option<String>,
    /// Number of federated clients.
    pub num_clients: Option<u64>,
    /// Number of samples drawn per label for each client.
    pub num_samples_by_label: Option<u64>,
    /// Number of ground-truth client clusters.
    pub num_clusters: Option<u64>,
    /// Epoch budget for centralized training.
    pub centralized_epochs: Option<u64>,
    /// Round budget for federated training.
    pub federated_rounds: Option<u64>,
    /// Master seed.
    pub seed: Option<i64>,
}

/// Borrowed view of a single record field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Textual value.
    Text(&'a str),
    /// Non-negative count.
    Count(u64),
    /// Signed integer (seeds).
    Integer(i64),
    /// No value bound.
    Missing,
}

impl Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Count(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Missing => f.write_str(crate::canonical::MISSING_TOKEN),
        }
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        value
            .as_deref()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing)
    }
}

impl From<Option<u64>> for FieldValue<'_> {
    fn from(value: Option<u64>) -> Self {
        value.map(FieldValue::Count).unwrap_or(FieldValue::Missing)
    }
}

impl From<Option<i64>> for FieldValue<'_> {
    fn from(value: Option<i64>) -> Self {
        value.map(FieldValue::Integer).unwrap_or(FieldValue::Missing)
    }
}

impl ExperimentRecord {
    /// Returns every field paired with its name, in [`FIELD_ORDER`].
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); 9] {
        [
            (FIELD_ORDER[0], (&self.exp_type).into()),
            (FIELD_ORDER[1], (&self.dataset).into()),
            (FIELD_ORDER[2], (&self.heterogeneity_type).into()),
            (FIELD_ORDER[3], self.num_clients.into()),
            (FIELD_ORDER[4], self.num_samples_by_label.into()),
            (FIELD_ORDER[5], self.num_clusters.into()),
            (FIELD_ORDER[6], self.centralized_epochs.into()),
            (FIELD_ORDER[7], self.federated_rounds.into()),
            (FIELD_ORDER[8], self.seed.into()),
        ]
    }

    /// Resolves the experiment kind, failing on missing or unknown values.
    pub fn kind(&self) -> Result<ExpKind, CflError> {
        match self.exp_type.as_deref() {
            Some(raw) => raw.parse(),
            None => Err(unrecognized_kind("None")),
        }
    }
}

/// Execution mode selected by the dispatch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpKind {
    /// Centralized and federated baselines.
    Benchmark,
    /// Clustered federated learning with client-side cluster selection.
    Client,
    /// Clustered federated learning with server-side clustering.
    Server,
}

impl ExpKind {
    /// All kinds in dispatch order.
    pub const ALL: [ExpKind; 3] = [ExpKind::Benchmark, ExpKind::Client, ExpKind::Server];

    /// Returns the identifier used on the command line and in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpKind::Benchmark => "benchmark",
            ExpKind::Client => "client",
            ExpKind::Server => "server",
        }
    }

    /// Returns the mode label used in operator traces.
    pub fn label(&self) -> &'static str {
        match self {
            ExpKind::Benchmark => "benchmark",
            ExpKind::Client => "client-side",
            ExpKind::Server => "server-side",
        }
    }
}

impl Display for ExpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpKind {
    type Err = CflError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ExpKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| unrecognized_kind(value))
    }
}

fn unrecognized_kind(value: &str) -> CflError {
    CflError::Config(
        ErrorInfo::new(
            "unrecognized-exp-type",
            format!("unrecognized experiment type {value}"),
        )
        .with_context("exp_type", value)
        .with_hint("expected one of benchmark, client, server; check the configuration and try again"),
    )
}
