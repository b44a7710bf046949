//! Shared state of the dev server: connected live-reload clients and the
//! last finished compilation.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stoke_core::{topic, Notifier, Stats};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Messages queued per client before new ones are dropped.
const CLIENT_BUFFER: usize = 100;

/// Wire format of one push: `{"type": "...", "data": ...}`.
#[derive(Debug, Serialize)]
pub struct PushMessage<'a> {
    #[serde(rename = "type")]
    pub topic: &'a str,
    pub data: &'a Value,
}

pub fn encode(topic: &str, payload: &Value) -> String {
    let message = PushMessage { topic, data: payload };
    // A struct of a str and a Value always serializes.
    serde_json::to_string(&message).unwrap_or_default()
}

pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct DevServerState {
    clients: ClientRegistry,
    next_client_id: AtomicUsize,
    statics_dir: PathBuf,
    latest: RwLock<Option<Stats>>,
}

pub type SharedState = Arc<DevServerState>;

impl DevServerState {
    pub fn new(statics_dir: PathBuf) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: AtomicUsize::new(0),
            statics_dir,
            latest: RwLock::new(None),
        }
    }

    pub fn statics_dir(&self) -> &Path {
        &self.statics_dir
    }

    /// Register a client. It is first sent the state of the latest cycle.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);

        for message in self.replay() {
            // Fresh channel with room to spare.
            let _ = tx.try_send(message);
        }
        self.clients.write().insert(id, tx);
        tracing::debug!(client = id, "live-reload client connected");

        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        if self.clients.write().remove(&id).is_some() {
            tracing::debug!(client = id, "live-reload client disconnected");
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Write one message to every connected client without waiting.
    ///
    /// Closed clients are removed; a client whose queue is full misses this
    /// message.
    pub fn push(&self, topic: &str, payload: &Value) {
        let message = encode(topic, payload);
        let mut closed = Vec::new();

        for (id, tx) in self.clients.read().iter() {
            match tx.try_send(message.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client = id, topic, "live-reload client is not keeping up; message dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        for id in closed {
            self.unregister_client(id);
        }
    }

    pub fn set_latest(&self, stats: Stats) {
        *self.latest.write() = Some(stats);
    }

    pub fn latest(&self) -> Option<Stats> {
        self.latest.read().clone()
    }

    /// `hash` and the status of the latest cycle, read from its live record
    /// so merged type-check findings are included.
    fn replay(&self) -> Vec<String> {
        let Some(stats) = self.latest() else {
            return Vec::new();
        };

        let (topic, payload) = status_message(&stats);
        vec![
            encode(topic::HASH, &Value::String(stats.hash().to_string())),
            encode(topic, &payload),
        ]
    }
}

/// The status push for a finished cycle: `errors`, `warnings` or `ok`.
///
/// Carries the full message lists, the same ones the type-check push sends.
pub fn status_message(stats: &Stats) -> (&'static str, Value) {
    let summary = stats.summary();
    if !summary.errors.is_empty() {
        (topic::ERRORS, Value::from(summary.errors))
    } else if !summary.warnings.is_empty() {
        (topic::WARNINGS, Value::from(summary.warnings))
    } else {
        (topic::OK, Value::Null)
    }
}

#[async_trait]
impl Notifier for DevServerState {
    async fn send(&self, topic: &str, payload: Value) {
        self.push(topic, &payload);
    }
}
