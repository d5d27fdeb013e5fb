use anyhow::Result;
use clap::Parser;

use calculate::cli::{self, CliArgs};

fn main() -> Result<()> {
    calculate::logging::init();
    let args = CliArgs::parse();
    cli::run(args)
}
