//! Command implementations.
//!
//! - [`dev`] - dev server with watch, type check and live reload
//! - [`build`] - one compile cycle
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod build;
pub mod dev;

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result, ResultExt};
use std::path::PathBuf;

/// Absolute project root: `--cwd` when given, else the current directory.
pub(crate) fn project_root(args: &ProjectArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = match &args.cwd {
        Some(dir) => cwd.join(dir),
        None => cwd,
    };

    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    root.canonicalize().with_path(&root)
}

