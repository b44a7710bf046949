//! The compiler: a bundler plus the lifecycle hooks around each pass.
//!
//! The bundler itself is external; [`Bundler`] is the seam. A [`Compiler`]
//! runs one cycle at a time: it signals `invalidated`, runs the bundler,
//! wraps the output into [`Stats`] and awaits every `done` subscriber.

use crate::error::{CoreError, Result};
use crate::hooks::CompilerHooks;
use crate::stats::{BuildOutput, Compilation, Stats};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::oneshot;

/// A single bundler pass.
///
/// Return `Ok` with errors inside [`BuildOutput`] for problems in user code.
/// Return `Err` only when the pass could not run at all.
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn build(&self) -> Result<BuildOutput>;
}

pub struct Compiler {
    bundler: Arc<dyn Bundler>,
    hooks: Arc<CompilerHooks>,
    cycles: AtomicU64,
    // Held for the whole cycle so invalidated/done strictly alternate.
    running: tokio::sync::Mutex<()>,
}

impl Compiler {
    pub fn new(bundler: Arc<dyn Bundler>) -> Self {
        Self {
            bundler,
            hooks: Arc::new(CompilerHooks::new()),
            cycles: AtomicU64::new(0),
            running: tokio::sync::Mutex::new(()),
        }
    }

    pub fn hooks(&self) -> &Arc<CompilerHooks> {
        &self.hooks
    }

    /// Number of cycles started so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Run one full cycle and return its stats once every done handler finished.
    pub async fn run(&self) -> Stats {
        let _cycle_guard = self.running.lock().await;
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(cycle, "compilation invalidated");
        self.hooks.emit_invalidated();

        let started = Instant::now();
        let output = match self.bundler.build().await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(cycle, error = %err, "bundler pass failed to run");
                BuildOutput::with_errors(vec![err.to_string()])
            }
        };

        let hash = cycle_hash(cycle, &output);
        let stats = Stats::new(Compilation::new(output), hash, started.elapsed());
        tracing::debug!(
            cycle,
            errors = stats.compilation().errors().len(),
            warnings = stats.compilation().warnings().len(),
            duration_ms = stats.duration().as_millis() as u64,
            "compilation done"
        );

        self.hooks.emit_done(&stats).await;
        stats
    }
}

impl Drop for Compiler {
    // Pending waiters own their senders through the done handlers.
    fn drop(&mut self) {
        self.hooks.clear();
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("hooks", &self.hooks)
            .field("cycles", &self.cycle_count())
            .finish()
    }
}

fn cycle_hash(cycle: u64, output: &BuildOutput) -> String {
    let mut input = cycle.to_string();
    for asset in &output.assets {
        input.push(':');
        input.push_str(asset);
    }
    format!("{:016x}", seahash::hash(input.as_bytes()))
}

/// Resolve with the stats of the next cycle that finishes.
///
/// Subscribes immediately, so the returned future may be awaited after the
/// cycle has been started elsewhere. Fails when that cycle had errors, or
/// with [`CoreError::CompilerStopped`] when the compiler is dropped first.
pub fn wait_for_compilation(compiler: &Compiler) -> impl Future<Output = Result<Stats>> + use<> {
    let (tx, rx) = oneshot::channel::<Stats>();
    let slot = Arc::new(Mutex::new(Some(tx)));

    let hooks = Arc::downgrade(compiler.hooks());
    let id = compiler.hooks().on_done(move |stats| {
        let slot = slot.clone();
        async move {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(stats);
            }
        }
    });

    async move {
        let received = rx.await;
        if let Some(hooks) = Weak::upgrade(&hooks) {
            hooks.unsubscribe(id);
        }

        let stats = received.map_err(|_| CoreError::CompilerStopped)?;
        if stats.has_errors() {
            return Err(CoreError::CompilationFailed {
                count: stats.compilation().errors().len(),
            });
        }
        Ok(stats)
    }
}
