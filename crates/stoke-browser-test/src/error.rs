//! Errors raised while driving the browser.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome is missing, not executable, or exited during startup.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout { condition: String, timeout: Duration },

    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    #[error("browser instance is already closed")]
    AlreadyClosed,

    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

impl BrowserError {
    pub(crate) fn script(err: impl std::fmt::Display) -> Self {
        BrowserError::ScriptExecutionFailed(err.to_string())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::WaitTimeout { .. })
    }
}
