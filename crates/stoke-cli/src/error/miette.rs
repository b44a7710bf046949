//! Conversion of CLI errors into miette reports for `main`.

use crate::error::{CliError, ConfigError};
use ::miette::{miette, Report};
use stoke_core::CoreError;

pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::Load(inner)) => {
            // figment reports one error per failing key; show all of them.
            let details: Vec<String> = inner.into_iter().map(|e| e.to_string()).collect();
            miette!(
                help = "Check stoke.config.json and STOKE_* environment variables",
                "Configuration error:\n{}",
                details.join("\n")
            )
        }
        CliError::Config(e) => miette!("Configuration error: {}", e),
        CliError::Core(CoreError::CompilationFailed { count }) => {
            miette!("Build failed with {} error(s)", count)
        }
        _ => miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_setup_report_keeps_heading() {
        let report = cli_error_to_miette(CliError::CompilerSetup("bad command".into()));
        assert!(report.to_string().starts_with("Failed to compile."));
    }

    #[test]
    fn test_config_errors_are_prefixed() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::invalid(
            "servers.cdn.port",
            3000,
            "Use a port different from servers.app.port",
        )));
        assert!(report.to_string().starts_with("Configuration error:"));
    }
}
