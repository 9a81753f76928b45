use std::error::Error;

use clap::Args;

#[derive(Args, Debug)]
pub struct VersionArgs {}

pub fn run(_args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    println!("{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
