use crate::config::ConfigOverrides;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dev server in watch mode
    ///
    /// Serves the statics directory, rebuilds when sources change, runs the
    /// type checker for TypeScript projects and reloads connected browsers.
    Dev(DevArgs),

    /// Run a single compile cycle
    ///
    /// Builds once (type-checking TypeScript projects) and exits non-zero
    /// when the cycle has errors.
    Build(BuildArgs),
}

/// Options shared by every command that works on a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file, relative to the project root
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Force the type checker on or off (default: on when tsconfig.json exists)
    #[arg(long, value_name = "BOOL")]
    pub typescript: Option<bool>,
}

#[derive(Args, Debug, Clone)]
pub struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port of the application server shown in the startup banner
    #[arg(short, long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Port the asset server listens on
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub cdn_port: Option<u16>,

    /// Interface to listen on
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Advertise the asset server over https
    #[arg(long)]
    pub https: bool,
}

impl DevArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            app_port: self.port,
            cdn_port: self.cdn_port,
            host: self.host.clone(),
            https: self.https,
            typescript: self.project.typescript,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl BuildArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            typescript: self.project.typescript,
            ..ConfigOverrides::default()
        }
    }
}
