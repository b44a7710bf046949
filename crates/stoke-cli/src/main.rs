//! stoke - entry point: parse arguments, set up logging, dispatch.

use clap::Parser;
use miette::Result;
use stoke_cli::{cli, commands, error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
