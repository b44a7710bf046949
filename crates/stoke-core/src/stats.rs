//! Finished-cycle records.
//!
//! A [`Compilation`] is the live, shared record of one cycle's outcome. Every
//! done-subscriber receives the same [`Stats`] handle, so a merge performed by
//! one subscriber is visible to every later reader of the record.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Errors and warnings of a cycle, without asset or module detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl StatsSummary {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self { errors, warnings }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Output of a single bundler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Emitted file names, relative to the output directory.
    pub assets: Vec<String>,
}

impl BuildOutput {
    pub fn with_errors(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}

/// Live compilation record of one cycle.
///
/// Mutable after the cycle is done so the result merger can attach
/// secondary-pass findings; readers always see the merged view afterwards.
#[derive(Debug, Default)]
pub struct Compilation {
    errors: RwLock<Vec<String>>,
    warnings: RwLock<Vec<String>>,
    assets: Vec<String>,
}

impl Compilation {
    pub fn new(output: BuildOutput) -> Self {
        Self {
            errors: RwLock::new(output.errors),
            warnings: RwLock::new(output.warnings),
            assets: output.assets,
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.read().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.read().clone()
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn push_errors<I: IntoIterator<Item = String>>(&self, errors: I) {
        self.errors.write().extend(errors);
    }

    pub fn push_warnings<I: IntoIterator<Item = String>>(&self, warnings: I) {
        self.warnings.write().extend(warnings);
    }
}

/// Handle to a finished cycle, shared by all done-subscribers.
#[derive(Debug, Clone)]
pub struct Stats {
    compilation: Arc<Compilation>,
    hash: String,
    duration: Duration,
}

impl Stats {
    pub fn new(compilation: Compilation, hash: impl Into<String>, duration: Duration) -> Self {
        Self {
            compilation: Arc::new(compilation),
            hash: hash.into(),
            duration,
        }
    }

    /// Snapshot of errors and warnings at the time of the call.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            errors: self.compilation.errors(),
            warnings: self.compilation.warnings(),
        }
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn has_errors(&self) -> bool {
        !self.compilation.errors.read().is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.compilation.warnings.read().is_empty()
    }
}
