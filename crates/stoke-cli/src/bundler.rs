//! Bundler passes the dev server can drive, and compiler construction.
//!
//! Projects with `build.command` get a [`CommandBundler`] that runs their
//! own build tool once per cycle. Projects without one get a
//! [`CopyBundler`] that mirrors `srcDir` into `staticsDir`.

use crate::config::ProjectConfig;
use crate::dev::watcher::is_ignored;
use crate::error::{CliError, Result};
use crate::process::{find_program, run_captured, Captured};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stoke_core::{add_entry, override_rules, BuildOutput, Bundler, Compiler, CoreError, Rule};
use walkdir::WalkDir;

/// Copies every non-ignored file under `src` to the same relative path
/// under `out`.
#[derive(Debug, Clone)]
pub struct CopyBundler {
    src: PathBuf,
    out: PathBuf,
    ignore: Vec<String>,
}

impl CopyBundler {
    pub fn new(src: impl Into<PathBuf>, out: impl Into<PathBuf>, ignore: Vec<String>) -> Self {
        Self {
            src: src.into(),
            out: out.into(),
            ignore,
        }
    }

    fn copy_tree(&self) -> stoke_core::Result<BuildOutput> {
        if !self.src.is_dir() {
            return Err(CoreError::Bundler(format!(
                "source directory {} does not exist",
                self.src.display()
            )));
        }

        let mut output = BuildOutput::default();
        for entry in WalkDir::new(&self.src).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    output.warnings.push(format!("{}\nskipped: {}", display_path(err.path()), err));
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&self.src) else {
                continue;
            };
            if !entry.file_type().is_file() || is_ignored(relative, &self.ignore) {
                continue;
            }
            let target = self.out.join(relative);
            let copied = target
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|()| std::fs::copy(entry.path(), &target));

            let name = relative.to_string_lossy().replace('\\', "/");
            match copied {
                Ok(_) => output.assets.push(name),
                Err(err) => output
                    .errors
                    .push(format!("./{}\nModule build failed: {}", name, err)),
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl Bundler for CopyBundler {
    async fn build(&self) -> stoke_core::Result<BuildOutput> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.copy_tree())
            .await
            .map_err(|e| CoreError::Bundler(format!("copy task panicked: {e}")))?
    }
}

/// Runs the project's own build tool once per cycle.
///
/// The tool learns about the dev setup from the environment:
/// `STOKE_MODE`, `STOKE_ENTRY` and `STOKE_RULES` (JSON), `STOKE_OUT_DIR`
/// and `STOKE_PUBLIC_PATH`.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    argv: Vec<String>,
    cwd: PathBuf,
    out: PathBuf,
    env: Vec<(String, String)>,
}

impl CommandBundler {
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>, out: impl Into<PathBuf>) -> Self {
        Self {
            argv,
            cwd: cwd.into(),
            out: out.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl Bundler for CommandBundler {
    async fn build(&self) -> stoke_core::Result<BuildOutput> {
        let captured = run_captured(&self.argv, &self.cwd, self.env.iter().map(|(k, v)| (k, v)))
            .await
            .map_err(|e| CoreError::Bundler(format!("failed to run `{}`: {}", self.argv.join(" "), e)))?;

        let mut output = parse_build_output(&captured);
        let out = self.out.clone();
        output.assets = tokio::task::spawn_blocking(move || list_assets(&out))
            .await
            .unwrap_or_default();
        Ok(output)
    }
}

/// Split tool output into errors and warnings.
///
/// Blank-line separated blocks starting with `ERROR` or `WARNING` are
/// picked up, with an `ERROR in `/`WARNING in ` prefix removed so the
/// message starts with the file. A failing exit status with no `ERROR`
/// block becomes a single error holding the whole output.
pub fn parse_build_output(captured: &Captured) -> BuildOutput {
    let text = captured.combined();
    let mut output = BuildOutput::default();

    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        if let Some(rest) = strip_heading(block, "ERROR") {
            output.errors.push(rest);
        } else if let Some(rest) = strip_heading(block, "WARNING") {
            output.warnings.push(rest);
        }
    }

    if !captured.success() && output.errors.is_empty() {
        let detail = if text.trim().is_empty() {
            format!("build command exited with {}", captured.status)
        } else {
            text.trim().to_string()
        };
        output.errors.push(detail);
    }

    output
}

fn strip_heading(block: &str, label: &str) -> Option<String> {
    let rest = block.strip_prefix(label)?;
    let rest = rest.strip_prefix(" in ").unwrap_or(rest);
    Some(rest.trim_start_matches(':').trim_start().to_string())
}

fn list_assets(out: &Path) -> Vec<String> {
    WalkDir::new(out)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(out)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string())
}

/// Rules as the dev build sees them: every loader emits source maps unless
/// the rule already says otherwise.
pub fn dev_rules(rules: &[Rule]) -> Vec<Rule> {
    override_rules(rules, &|rule: &Rule| {
        let mut rule = rule.clone();
        if rule.get("loader").is_some() {
            let options = rule
                .options
                .entry("options")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Some(options) = options.as_object_mut() {
                options.entry("sourceMap").or_insert(json!(true));
            }
        }
        rule
    })
}

/// Build the compiler for a project. Failures here are fatal for the
/// dev session.
pub fn create_compiler(config: &ProjectConfig, root: &Path) -> Result<Compiler> {
    let statics = config.statics_path(root);
    std::fs::create_dir_all(&statics).map_err(|e| {
        CliError::CompilerSetup(format!("cannot create {}: {}", statics.display(), e))
    })?;

    let bundler: Arc<dyn Bundler> = match &config.build.command {
        Some(argv) => {
            let program = argv.first().map(String::as_str).unwrap_or_default();
            if find_program(program, root).is_none() {
                return Err(CliError::CompilerSetup(format!(
                    "build command `{}` was not found",
                    program
                )));
            }

            let entry = add_entry(&config.entry, &config.hot_entries);
            let entry = serde_json::to_string(&entry)
                .map_err(|e| CliError::CompilerSetup(format!("entry: {e}")))?;
            let rules = serde_json::to_string(&dev_rules(&config.rules))
                .map_err(|e| CliError::CompilerSetup(format!("rules: {e}")))?;

            tracing::debug!(command = ?argv, %entry, "using build command");
            Arc::new(
                CommandBundler::new(argv.clone(), root, &statics)
                    .with_env("STOKE_MODE", "development")
                    .with_env("STOKE_ENTRY", entry)
                    .with_env("STOKE_RULES", rules)
                    .with_env("STOKE_OUT_DIR", statics.to_string_lossy())
                    .with_env("STOKE_PUBLIC_PATH", config.public_path.clone()),
            )
        }
        None => {
            tracing::debug!(src = %config.src_dir.display(), "no build command; copying sources");
            Arc::new(CopyBundler::new(
                config.src_path(root),
                statics,
                config.watch.ignore.clone(),
            ))
        }
    };

    Ok(Compiler::new(bundler))
}
