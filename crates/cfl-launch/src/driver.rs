use cfl_core::errors::CflError;
use cfl_core::{canonicalize, fingerprint, ExpKind, ExperimentRecord, Fingerprint};
use cfl_store::{ArtifactReceipt, ResultStore};
use tracing::{error, warn};

use crate::builder::ExperimentBuilder;
use crate::dispatch::dispatch;
use crate::handlers::ExecutionHandlers;

/// Options governing a launch.
#[derive(Debug, Clone)]
pub struct LaunchOpts {
    /// Take an exclusive per-fingerprint claim before building.
    pub claim: bool,
}

impl Default for LaunchOpts {
    fn default() -> Self {
        Self { claim: true }
    }
}

/// How a launch ended when it did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// An artifact with the same identity already exists.
    Duplicate {
        /// Stem of the existing artifact.
        existing: String,
        /// Output name computed for this invocation.
        output_name: String,
    },
    /// Another invocation currently holds the claim for this identity.
    InProgress {
        /// Output name computed for this invocation.
        output_name: String,
    },
    /// The builder rejected the record; nothing was executed.
    BuildFailed {
        /// Output name computed for this invocation.
        output_name: String,
        /// Rendered builder error.
        reason: String,
    },
    /// A handler ran and wrote its artifact.
    Completed {
        /// Mode that was dispatched.
        kind: ExpKind,
        /// Artifact confirmation returned by the handler.
        receipt: ArtifactReceipt,
    },
}

/// Runs records through duplicate detection, construction and dispatch.
pub struct Launcher<B, H> {
    store: ResultStore,
    builder: B,
    handlers: H,
    opts: LaunchOpts,
}

impl<B, H> Launcher<B, H>
where
    B: ExperimentBuilder,
    H: ExecutionHandlers<B::Server, B::Client>,
{
    /// Creates a launcher over `store`.
    pub fn new(store: ResultStore, builder: B, handlers: H, opts: LaunchOpts) -> Self {
        Self {
            store,
            builder,
            handlers,
            opts,
        }
    }

    /// Execution handlers, e.g. to inspect them after a run.
    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    /// Launches `record` unless an identical run already exists.
    ///
    /// Only an unrecognized experiment kind and handler failures are returned
    /// as errors; duplicates, held claims and build failures are reported
    /// through [`LaunchOutcome`] and logged.
    pub fn launch(&mut self, record: &ExperimentRecord) -> Result<LaunchOutcome, CflError> {
        let kind = record.kind()?;
        let output_name = canonicalize(record);
        let id = fingerprint(&output_name);

        if let Some(duplicate) = self.duplicate_of(&id, &output_name) {
            return Ok(duplicate);
        }

        // Held until the handler returns so concurrent invocations see the run as taken.
        let _claim = if self.opts.claim {
            match self.store.claim(&id, &output_name) {
                Ok(Some(guard)) => {
                    // A holder may have finished between the scan above and this claim.
                    if let Some(duplicate) = self.duplicate_of(&id, &output_name) {
                        return Ok(duplicate);
                    }
                    Some(guard)
                }
                Ok(None) => {
                    warn!(
                        fingerprint = %id,
                        "Experiment {output_name} is already being executed by another invocation"
                    );
                    return Ok(LaunchOutcome::InProgress { output_name });
                }
                Err(err) => {
                    warn!(error = %err, "could not claim {output_name}; continuing unclaimed");
                    None
                }
            }
        } else {
            None
        };

        let (server, clients) = match self.builder.build(record) {
            Ok(built) => built,
            Err(err) => {
                error!(
                    code = %err.info().code,
                    "Could not run experiment with parameters {output_name}. {err}"
                );
                return Ok(LaunchOutcome::BuildFailed {
                    output_name,
                    reason: err.to_string(),
                });
            }
        };

        let receipt = dispatch(kind, &mut self.handlers, server, clients, record, &output_name)?;
        Ok(LaunchOutcome::Completed { kind, receipt })
    }

    fn duplicate_of(&self, id: &Fingerprint, output_name: &str) -> Option<LaunchOutcome> {
        let existing = self.store.find_duplicate(id)?;
        warn!(
            fingerprint = %id,
            "Experiment {existing} already executed with results in {output_name}.{}",
            self.store.suffix()
        );
        Some(LaunchOutcome::Duplicate {
            existing,
            output_name: output_name.to_string(),
        })
    }
}
