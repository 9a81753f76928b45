use cfl_core::errors::{CflError, ErrorInfo};
use cfl_core::{flatten, ExpKind, ExperimentRecord};
use cfl_store::ArtifactReceipt;
use tracing::info;

use crate::handlers::ExecutionHandlers;

/// Invokes exactly one handler for `kind` and checks the artifact it reports.
///
/// The receipt must name `output_name` and point at a file whose stem is
/// `output_name`; anything else would make the run invisible to later
/// duplicate checks.
pub fn dispatch<S, C, H>(
    kind: ExpKind,
    handlers: &mut H,
    server: S,
    clients: Vec<C>,
    record: &ExperimentRecord,
    output_name: &str,
) -> Result<ArtifactReceipt, CflError>
where
    H: ExecutionHandlers<S, C> + ?Sized,
{
    info!(
        mode = kind.as_str(),
        "Launching {} experiment with parameters: {}",
        kind.label(),
        flatten(record)
    );
    let receipt = match kind {
        ExpKind::Benchmark => handlers.run_benchmark(clients, record, output_name, server)?,
        ExpKind::Client => handlers.run_client_side(server, clients, record, output_name)?,
        ExpKind::Server => handlers.run_server_side(server, clients, record, output_name)?,
    };
    if receipt.output_name != output_name || receipt.stem() != Some(output_name) {
        return Err(CflError::Handler(
            ErrorInfo::new(
                "artifact-name-mismatch",
                format!("{kind} handler reported an artifact not named after the run"),
            )
            .with_context("expected", output_name)
            .with_context("reported", receipt.path.display().to_string()),
        ));
    }
    Ok(receipt)
}
