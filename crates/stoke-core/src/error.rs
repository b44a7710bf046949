//! Error types for the coordination core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The bundler could not run at all (spawn failure, missing output dir, ...).
    ///
    /// Compilation errors in user code are *not* reported through this variant;
    /// they travel inside the finished cycle's stats.
    #[error("bundler failed: {0}")]
    Bundler(String),

    /// The secondary type-check pass could not run.
    #[error("type checker failed: {0}")]
    Checker(String),

    /// The compiler finished a cycle with errors.
    #[error("compilation failed with {count} error(s)")]
    CompilationFailed { count: usize },

    /// The compiler was dropped before finishing a cycle.
    #[error("compiler stopped before a cycle finished")]
    CompilerStopped,
}
