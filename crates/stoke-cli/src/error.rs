//! Error types for the stoke CLI.
//!
//! `CliError` is what commands return. `ConfigError` covers loading and
//! validating `stoke.config.json`. Both carry a `Hint:` line where the fix
//! is not obvious from the message alone.
//!
//! ```rust,no_run
//! use stoke_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_index(statics: &Path) -> Result<String> {
//!     let path = statics.join("index.html");
//!     std::fs::read_to_string(&path).with_path(&path)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use stoke_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The compiler could not be set up. Printed under the same heading as
    /// a failed cycle.
    #[error("Failed to compile.\n\n{0}")]
    CompilerSetup(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}\n\nHint: Create a stoke.config.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Figment failed to parse or merge a source.
    #[error("{0}\n\nHint: Check stoke.config.json and STOKE_* environment variables")]
    Load(Box<figment::Error>),

    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, value: impl std::fmt::Display, hint: &str) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            hint: hint.to_string(),
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Context helper for any error that converts into [`CliError`].
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_setup_uses_cycle_heading() {
        let err = CliError::CompilerSetup("build command `webpack` not found".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to compile.\n\nbuild command `webpack` not found"
        );
    }

    #[test]
    fn test_config_not_found_has_hint() {
        let msg = ConfigError::NotFound(PathBuf::from("stoke.config.json")).to_string();
        assert!(msg.contains("stoke.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_invalid_value_message() {
        let msg = ConfigError::invalid("servers.cdn.port", 3000, "Use a port different from servers.app.port")
            .to_string();
        assert!(msg.starts_with("Invalid value for 'servers.cdn.port': 3000"));
        assert!(msg.ends_with("Use a port different from servers.app.port"));
    }

    #[test]
    fn test_with_path_maps_not_found() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_path("dist/statics/index.html").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(p) if p.ends_with("index.html")));
    }

    #[test]
    fn test_with_path_keeps_other_io_errors() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"));
        assert!(matches!(result.with_path("x").unwrap_err(), CliError::Io(_)));
    }
}
