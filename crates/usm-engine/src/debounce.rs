//! Per-key debounce timers with cancellation.
//!
//! Each key has at most one pending timer. Scheduling a key that already has a
//! pending timer cancels the old one and starts over, so a burst of edits
//! coalesces into one callback fired `delay` after the last edit.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{runtime::Handle, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A pending timer.
struct PendingEntry {
    /// Cancels the timer before it fires.
    token: CancellationToken,
    /// Task driving the timer.
    handle: JoinHandle<()>,
    /// Distinguishes this entry from a later replacement under the same key.
    seq: u64,
}

/// Coalescing timer set keyed by string id.
#[derive(Clone)]
pub struct Debouncer {
    /// Pending timers by key.
    entries: Arc<Mutex<HashMap<String, PendingEntry>>>,
    /// Sequence source for [`PendingEntry::seq`].
    next_seq: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    /// Empty timer set.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start or replace the timer for `id`; `on_fire` runs once after `delay`
    /// unless cancelled or replaced first.
    ///
    /// Returns `false` without scheduling anything when called outside a Tokio
    /// runtime; the caller is expected to run its work immediately instead.
    pub fn schedule<F>(&self, id: String, delay: Duration, on_fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(rt) = Handle::try_current() else {
            trace!(id = %id, "debounce_no_runtime");
            return false;
        };

        let token = CancellationToken::new();
        let cancel = token.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.clone();
        let id_for_task = id.clone();

        let fut = async move {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    trace!(id = %id_for_task, "debounce_cancelled");
                    return;
                }
            }
            {
                let mut map = entries.lock();
                if map.get(&id_for_task).is_some_and(|e| e.seq == seq) {
                    map.remove(&id_for_task);
                }
            }
            if cancel.is_cancelled() {
                return;
            }
            trace!(id = %id_for_task, "debounce_fire");
            on_fire();
        };

        // Hold the map across spawn + insert so the task cannot observe a
        // missing entry for itself.
        let mut map = self.entries.lock();
        if let Some(prev) = map.remove(&id) {
            prev.token.cancel();
        }
        trace!(id = %id, delay_ms = delay.as_millis(), "debounce_schedule");
        let handle = rt.spawn(fut);
        map.insert(id, PendingEntry { token, handle, seq });
        true
    }

    /// Whether a timer for `id` is still waiting to fire.
    pub fn is_pending(&self, id: &str) -> bool {
        self.entries
            .lock()
            .get(id)
            .is_some_and(|e| !e.handle.is_finished())
    }

    /// Number of timers still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| !e.handle.is_finished())
            .count()
    }

    /// Cancel the timer for `id`, if any (non-blocking).
    pub fn cancel(&self, id: &str) {
        if let Some(entry) = self.entries.lock().remove(id) {
            entry.token.cancel();
            trace!(id = %id, "debounce_cancel");
        }
    }

    /// Cancel every pending timer (non-blocking).
    pub fn cancel_all(&self) {
        let drained: Vec<PendingEntry> = {
            let mut map = self.entries.lock();
            map.drain().map(|(_, e)| e).collect()
        };
        for e in &drained {
            e.token.cancel();
        }
        if !drained.is_empty() {
            trace!(count = drained.len(), "debounce_cancel_all");
        }
    }
}
