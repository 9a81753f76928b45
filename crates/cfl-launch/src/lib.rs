#![deny(missing_docs)]
#![doc = "Duplicate-aware launch pipeline routing experiment records to execution handlers."]

/// Experiment construction seam and the default federated setup.
pub mod builder;
/// Dispatch controller selecting one execution handler per kind.
pub mod dispatch;
/// End-to-end launch pipeline.
pub mod driver;
/// Execution handler seam and the default summary handlers.
pub mod handlers;
/// Settings file loading.
pub mod settings;

pub use builder::{ClientSpec, ExperimentBuilder, FederatedSetup, ServerModel, MAX_CLIENTS};
pub use dispatch::dispatch;
pub use driver::{LaunchOpts, LaunchOutcome, Launcher};
pub use handlers::{ExecutionHandlers, SummaryHandlers};
pub use settings::{load_settings, LaunchSettings};
