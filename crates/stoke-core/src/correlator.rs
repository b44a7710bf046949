//! Per-cycle correlation between the bundler and the secondary pass.
//!
//! Every cycle gets its own one-shot channel. The sending half
//! ([`CheckResolver`]) is handed out when the cycle starts and moves into the
//! task running the check; the receiving half ([`PendingCheck`]) sits in a
//! single slot until the result merger takes it. Starting a new cycle
//! replaces the slot, dropping the previous receiver: a late check from a
//! superseded cycle then resolves into a closed channel and can never reach
//! the current cycle's waiter.

use crate::diagnostic::CheckReport;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(u64);

impl CycleId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sending half for one cycle's check result. Resolves at most once.
#[derive(Debug)]
pub struct CheckResolver {
    cycle: CycleId,
    tx: oneshot::Sender<CheckReport>,
}

impl CheckResolver {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Deliver the report. Returns `false` when the cycle was superseded and
    /// nobody is waiting for it any more.
    pub fn resolve(self, report: CheckReport) -> bool {
        self.tx.send(report).is_ok()
    }
}

/// Receiving half for one cycle's check result.
///
/// Resolves to `None` if the resolver was dropped without a report (the
/// check task failed or panicked), so waiting on it never hangs forever.
#[derive(Debug)]
pub struct PendingCheck {
    cycle: CycleId,
    rx: oneshot::Receiver<CheckReport>,
}

impl PendingCheck {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }
}

impl Future for PendingCheck {
    type Output = Option<CheckReport>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

#[derive(Debug, Default)]
pub struct CycleCorrelator {
    next: AtomicU64,
    pending: Mutex<Option<PendingCheck>>,
}

impl CycleCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh await-point for a new cycle, abandoning any previous one.
    pub fn begin_cycle(&self) -> CheckResolver {
        let cycle = CycleId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        let (tx, rx) = oneshot::channel();

        let previous = self.pending.lock().replace(PendingCheck { cycle, rx });
        if let Some(previous) = previous {
            tracing::debug!(
                abandoned = %previous.cycle,
                current = %cycle,
                "type check superseded by a newer cycle"
            );
        }

        CheckResolver { cycle, tx }
    }

    /// Take the current cycle's await-point, if one is registered.
    pub fn take_pending(&self) -> Option<PendingCheck> {
        self.pending.lock().take()
    }

    /// Cycle whose await-point is currently registered.
    pub fn current_cycle(&self) -> Option<CycleId> {
        self.pending.lock().as_ref().map(|pending| pending.cycle)
    }
}
