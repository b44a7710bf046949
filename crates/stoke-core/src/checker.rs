//! The secondary pass: a type checker running beside the bundler.

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use async_trait::async_trait;

/// An out-of-band diagnostic pass.
///
/// Started once per cycle, concurrently with the bundler. It may take
/// arbitrarily long; results are correlated back to the cycle that started it.
#[async_trait]
pub trait TypeChecker: Send + Sync {
    async fn check(&self) -> Result<Vec<Diagnostic>>;
}
