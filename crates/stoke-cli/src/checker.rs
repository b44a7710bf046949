//! The TypeScript checker as an external `tsc --noEmit` run.

use crate::process::{find_program, run_captured};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use stoke_core::{parse_tsc_output, CoreError, Diagnostic, TypeChecker};

#[derive(Debug, Clone)]
pub struct TscChecker {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl TscChecker {
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            argv,
            cwd: cwd.into(),
        }
    }

    /// `None` when the program cannot be found, so the session can run
    /// without type checking instead of failing every cycle.
    pub fn locate(argv: Vec<String>, cwd: &Path) -> Option<Self> {
        let program = argv.first()?;
        find_program(program, cwd)?;
        Some(Self::new(argv, cwd))
    }
}

#[async_trait]
impl TypeChecker for TscChecker {
    async fn check(&self) -> stoke_core::Result<Vec<Diagnostic>> {
        let captured = run_captured(&self.argv, &self.cwd, std::iter::empty::<(&str, &str)>())
            .await
            .map_err(|e| CoreError::Checker(format!("failed to run `{}`: {}", self.argv.join(" "), e)))?;

        // tsc exits non-zero whenever it reports errors.
        let diagnostics = parse_tsc_output(&captured.combined());
        if diagnostics.is_empty() && !captured.success() {
            let detail = captured.combined();
            return Err(CoreError::Checker(if detail.trim().is_empty() {
                format!("`{}` exited with {}", self.argv.join(" "), captured.status)
            } else {
                detail
            }));
        }

        tracing::debug!(count = diagnostics.len(), "type check finished");
        Ok(diagnostics)
    }
}
