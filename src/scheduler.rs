//! Periodic background tasks around a shared store.
//!
//! The index, archive and controller are synchronous; this module is the only
//! place that knows about timers. Each task runs on the ambient Tokio runtime
//! until its [`CancellationToken`] fires, so the spawn functions must be
//! called from within a runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::store::TieredVectorStore;
use crate::synthetic::SyntheticLoad;

/// Handle to a running periodic task.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the task to stop after its current iteration.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            warn!(task = self.name, error = %err, "periodic task ended abnormally");
        }
    }
}

/// Flush shortly after every window boundary, read from the store clock.
pub fn spawn_auto_flush(store: Arc<TieredVectorStore>) -> PeriodicTask {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let settle_ms = store.config().tiering.flush_settle_ms;

    let handle = tokio::spawn(async move {
        loop {
            let now = store.clock().now_ms();
            let wait = store.windowing().until_next_boundary(now) + settle_ms;
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(wait)) => {
                    let created = store.flush_now();
                    debug!(partitions = created.len(), "automatic flush");
                }
            }
        }
    });

    PeriodicTask {
        name: "auto-flush",
        token,
        handle,
    }
}

/// Insert one synthetic embedding every `every`, stamped with the store clock.
pub fn spawn_auto_insert(
    store: Arc<TieredVectorStore>,
    mut load: SyntheticLoad,
    every: Duration,
) -> PeriodicTask {
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = store.insert_now(load.next_embedding()) {
                        warn!(error = %err, "synthetic insert rejected");
                    }
                }
            }
        }
    });

    PeriodicTask {
        name: "auto-insert",
        token,
        handle,
    }
}
