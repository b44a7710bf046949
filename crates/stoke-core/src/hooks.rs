//! Observer registry for compile-cycle boundaries.
//!
//! Subscribers register with [`CompilerHooks::on_invalidated`] and
//! [`CompilerHooks::on_done`]. Invalidated handlers are synchronous and run
//! in registration order the moment a new cycle starts. Done handlers are
//! async; the compiler awaits each one in registration order before the
//! cycle is considered finished, so side effects of earlier subscribers
//! (for example a merge into the live compilation record) are visible to
//! later ones.

use crate::stats::Stats;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type InvalidatedHandler = Arc<dyn Fn() + Send + Sync>;
type DoneHandler = Arc<dyn Fn(Stats) -> BoxFuture<'static, ()> + Send + Sync>;

/// Identifies a registered handler so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct CompilerHooks {
    next_id: AtomicU64,
    invalidated: RwLock<Vec<(SubscriptionId, InvalidatedHandler)>>,
    done: RwLock<Vec<(SubscriptionId, DoneHandler)>>,
}

impl CompilerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe to the start of every cycle.
    pub fn on_invalidated<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.invalidated.write().push((id, Arc::new(handler)));
        id
    }

    /// Subscribe to the end of every cycle.
    pub fn on_done<F, Fut>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(Stats) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id();
        let handler: DoneHandler = Arc::new(move |stats| handler(stats).boxed());
        self.done.write().push((id, handler));
        id
    }

    /// Remove a handler. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.invalidated.write().retain(|(sub, _)| {
            let keep = *sub != id;
            removed |= !keep;
            keep
        });
        self.done.write().retain(|(sub, _)| {
            let keep = *sub != id;
            removed |= !keep;
            keep
        });
        removed
    }

    /// Drop every handler, and whatever each one owns.
    pub(crate) fn clear(&self) {
        self.invalidated.write().clear();
        self.done.write().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.invalidated.read().len() + self.done.read().len()
    }

    pub(crate) fn emit_invalidated(&self) {
        // Snapshot first so handlers may (un)subscribe without deadlocking.
        let handlers: Vec<InvalidatedHandler> =
            self.invalidated.read().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler();
        }
    }

    pub(crate) async fn emit_done(&self, stats: &Stats) {
        let handlers: Vec<DoneHandler> = self.done.read().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(stats.clone()).await;
        }
    }
}

impl std::fmt::Debug for CompilerHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerHooks")
            .field("invalidated", &self.invalidated.read().len())
            .field("done", &self.done.read().len())
            .finish()
    }
}
