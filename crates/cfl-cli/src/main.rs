use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    fingerprint::{self, FingerprintArgs},
    run::{self, RunArgs},
    version::{self, VersionArgs},
};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "cfl", about = "Federated learning experiment driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch an experiment unless an identical run already has results.
    Run(RunArgs),
    /// Print the output name and fingerprint of a parameter record.
    Fingerprint(FingerprintArgs),
    /// Print the driver version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Fingerprint(args) => fingerprint::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
