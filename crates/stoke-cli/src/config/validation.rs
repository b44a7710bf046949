use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};
use std::path::Path;

fn validate_command(field: &str, command: &[String]) -> Result<()> {
    match command.first() {
        None => Err(ConfigError::MissingField {
            field: field.to_string(),
            hint: "Give the program and its arguments as a list, e.g. [\"npx\", \"tsc\"]".to_string(),
        }
        .into()),
        Some(program) if program.trim().is_empty() => {
            Err(ConfigError::invalid(field, "\"\"", "The program name cannot be empty").into())
        }
        Some(_) => Ok(()),
    }
}

impl ProjectConfig {
    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        let app_port = self.servers.app.port;
        let cdn_port = self.servers.cdn.port;

        if app_port == 0 {
            return Err(ConfigError::invalid("servers.app.port", 0, "Pick a fixed port, e.g. 3000").into());
        }
        if cdn_port == 0 {
            return Err(ConfigError::invalid("servers.cdn.port", 0, "Pick a fixed port, e.g. 3200").into());
        }
        if app_port == cdn_port {
            return Err(ConfigError::invalid(
                "servers.cdn.port",
                cdn_port,
                "The asset server needs a port different from servers.app.port",
            )
            .into());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("host", "\"\"", "Use 0.0.0.0 to listen on every interface").into());
        }

        if let Some(command) = &self.build.command {
            validate_command("build.command", command)?;
        }
        validate_command("typecheck.command", &self.typecheck.command)?;

        if let Some(empty) = self.hot_entries.iter().position(|e| e.trim().is_empty()) {
            return Err(ConfigError::invalid(
                &format!("hotEntries[{}]", empty),
                "\"\"",
                "Hot entries are module paths such as ./hot-client.js",
            )
            .into());
        }

        Ok(())
    }

    /// Check directories against the project root.
    pub fn validate_paths(&self, root: &Path) -> Result<()> {
        let src = self.src_path(root);
        if !src.is_dir() {
            return Err(ConfigError::invalid(
                "srcDir",
                src.display(),
                "The source directory must exist; set srcDir in stoke.config.json",
            )
            .into());
        }

        // Writing output into the watched tree would rebuild forever.
        if self.statics_path(root).starts_with(&src) {
            return Err(ConfigError::invalid(
                "staticsDir",
                self.statics_dir.display(),
                "Put build output outside srcDir",
            )
            .into());
        }

        Ok(())
    }
}
