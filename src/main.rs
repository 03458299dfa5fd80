use std::process::ExitCode;

use clap::Parser;
use pixelsmith::{cli, logger};

fn main() -> ExitCode {
    // Session log (overwrites previous session log)
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
