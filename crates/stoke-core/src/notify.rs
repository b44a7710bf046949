//! Push channel to live-reload clients, and the user-facing reporter.

use crate::messages::CycleStatus;
use crate::urls::ServerUrls;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

/// Topic names understood by the live-reload client.
pub mod topic {
    pub const INVALID: &str = "invalid";
    pub const HASH: &str = "hash";
    pub const OK: &str = "ok";
    pub const ERRORS: &str = "errors";
    pub const WARNINGS: &str = "warnings";
}

/// Best-effort, one-way push to every connected client.
///
/// Implementations swallow delivery failures; having no listeners is normal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, topic: &str, payload: Value);
}

/// Notifier for sessions without a live-reload transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _topic: &str, _payload: Value) {}
}

/// Notifier that records every push, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Value)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(topic, _)| topic.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, topic: &str, payload: Value) {
        self.sent.lock().push((topic.to_string(), payload));
    }
}

/// Server addresses shown once a cycle compiles cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupInfo {
    pub app: ServerUrls,
    pub cdn: ServerUrls,
}

/// Human-facing output of the coordinator.
///
/// The console rendering lives outside the core; this trait only fixes
/// *when* each piece of output happens.
pub trait Reporter: Send + Sync {
    /// A new cycle started.
    fn compiling(&self);

    /// Bundler finished but the type check is still running.
    fn waiting_for_type_check(&self);

    /// Final outcome of a cycle, already truncated for display.
    fn cycle_finished(&self, status: &CycleStatus);

    /// Cycle compiled with no errors and no warnings in an interactive session.
    fn startup_info(&self, info: &StartupInfo);
}

/// Reporter that prints nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn compiling(&self) {}
    fn waiting_for_type_check(&self) {}
    fn cycle_finished(&self, _status: &CycleStatus) {}
    fn startup_info(&self, _info: &StartupInfo) {}
}
