//! Command-line interface definition.
//!
//! - `stoke dev` - watch, rebuild, type-check and live-reload
//! - `stoke build` - one compile cycle, non-zero exit on errors

mod commands;
mod tests;

use clap::Parser;

pub use commands::{BuildArgs, Command, DevArgs, ProjectArgs};

/// stoke - a dev server that keeps the bundler and the type checker in step
#[derive(Parser, Debug)]
#[command(
    name = "stoke",
    version,
    about = "Dev server with live reload and type-checked rebuilds",
    long_about = "stoke rebuilds your sources on every change, runs the TypeScript checker\n\
                  beside the bundler, and pushes the combined result to the browser."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
