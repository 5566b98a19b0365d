//! Per-destination mutual exclusion.
//!
//! One lazily created mutex per destination id. Events for the same
//! destination run their critical section one at a time; different
//! destinations never contend. A permit owns its guard so it can move into
//! the detached delivery task, and the map entry is dropped once nobody holds
//! or waits for it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

type LockMap = DashMap<String, Arc<Mutex<()>>>;

#[derive(Clone, Default)]
pub struct DestinationGate {
    locks: Arc<LockMap>,
}

impl DestinationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the destination is free and take it. There is no timeout.
    pub async fn acquire(&self, destination_id: &str) -> GatePermit {
        let lock = self
            .locks
            .entry(destination_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = match lock.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(destination_id, "Destination busy, waiting for gate");
                lock.lock_owned().await
            }
        };

        GatePermit {
            guard: Some(guard),
            key: destination_id.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of destinations with a live lock.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one destination; released on drop.
pub struct GatePermit {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<LockMap>,
}

impl GatePermit {
    pub fn destination_id(&self) -> &str {
        &self.key
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Release first so the guard's reference no longer counts.
        drop(self.guard.take());
        // The map holds one reference; any other is a holder or a waiter.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl std::fmt::Debug for GatePermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatePermit")
            .field("destination_id", &self.key)
            .finish()
    }
}
