//! Per-owner publish/subscribe of committed settings.

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use parking_lot::Mutex;
use schema::Values;
use tracing::{debug, warn};

/// Callback invoked with the finalized values of an owner.
pub type Listener = Arc<dyn Fn(&Values) + Send + Sync>;

/// Handle returned by [`Broadcaster::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners keyed by owner id.
#[derive(Default)]
struct Topics {
    /// Id handed to the next subscriber.
    next_id: u64,
    /// Subscribers of each owner in registration order.
    by_owner: HashMap<String, Vec<(ListenerId, Listener)>>,
}

/// Delivers committed settings to listeners, one topic per owner id.
#[derive(Clone, Default)]
pub struct Broadcaster {
    /// Subscribers shared between clones.
    topics: Arc<Mutex<Topics>>,
}

impl Broadcaster {
    /// Empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `owner`. Listeners run in registration order.
    pub fn subscribe(&self, owner: &str, listener: Listener) -> ListenerId {
        let mut topics = self.topics.lock();
        let id = ListenerId(topics.next_id);
        topics.next_id += 1;
        topics
            .by_owner
            .entry(owner.to_string())
            .or_default()
            .push((id, listener));
        debug!(owner = %owner, listener = id.0, "listener_added");
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut topics = self.topics.lock();
        let mut removed = false;
        topics.by_owner.retain(|_, list| {
            let before = list.len();
            list.retain(|(lid, _)| *lid != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Number of listeners registered for `owner`.
    pub fn listener_count(&self, owner: &str) -> usize {
        self.topics.lock().by_owner.get(owner).map_or(0, Vec::len)
    }

    /// Deliver `values` to every listener of `owner`, synchronously and in
    /// registration order. A panicking listener is logged and skipped; the
    /// rest still receive the values. Returns the number of listeners that
    /// completed normally.
    ///
    /// Listeners run without any broadcaster lock held, so they may subscribe,
    /// unsubscribe, or publish themselves.
    pub fn publish(&self, owner: &str, values: &Values) -> usize {
        let listeners: Vec<(ListenerId, Listener)> = {
            let topics = self.topics.lock();
            topics.by_owner.get(owner).cloned().unwrap_or_default()
        };
        let mut delivered = 0;
        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(values))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(owner = %owner, listener = id.0, "listener_panicked"),
            }
        }
        debug!(owner = %owner, delivered, "settings_published");
        delivered
    }
}
