use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use serde_json::Value;

/// Listener invoked with the `data` field of a dispatched message
pub type EventCallback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Listener {
    id: u64,
    callback: EventCallback,
}

/// Maps event types to their listeners, in registration order
pub struct ListenerRegistry {
    /// event_type -> listeners
    listeners: DashMap<String, Vec<Listener>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Empty registry, shared behind an `Arc` so subscriptions can hold a weak handle
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register `callback` for `event_type`
    pub fn subscribe<F>(self: &Arc<Self>, event_type: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.listeners
            .entry(event_type.clone())
            .or_default()
            .push(Listener {
                id,
                callback: Arc::new(callback),
            });

        tracing::debug!(event_type = %event_type, listener_id = id, "Listener registered");

        Subscription {
            registry: Arc::downgrade(self),
            event_type,
            id,
        }
    }

    fn remove(&self, event_type: &str, id: u64) {
        let now_empty = match self.listeners.get_mut(event_type) {
            Some(mut listeners) => {
                listeners.retain(|l| l.id != id);
                listeners.is_empty()
            }
            None => return,
        };

        if now_empty {
            self.listeners.remove_if(event_type, |_, listeners| listeners.is_empty());
        }

        tracing::debug!(event_type = %event_type, listener_id = id, "Listener removed");
    }

    /// Deliver `data` to every listener of `event_type`; returns how many ran.
    ///
    /// Runs over a snapshot, so callbacks may subscribe or unsubscribe freely.
    /// A panicking callback is logged and skipped; the rest still run.
    pub fn dispatch(&self, event_type: &str, data: &Value) -> usize {
        let callbacks: Vec<(u64, EventCallback)> = match self.listeners.get(event_type) {
            Some(listeners) => listeners
                .iter()
                .map(|l| (l.id, l.callback.clone()))
                .collect(),
            None => return 0,
        };

        for (id, callback) in &callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(data))).is_err() {
                tracing::debug!(event_type = %event_type, listener_id = id, "Listener panicked");
            }
        }
        callbacks.len()
    }

    /// Whether any listener is registered for `event_type`
    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.listeners.contains_key(event_type)
    }

    /// Number of listeners registered for `event_type`
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .get(event_type)
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Event types with at least one listener, sorted
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.listeners.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }
}

/// Handle returned by [`ListenerRegistry::subscribe`]
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    event_type: String,
    id: u64,
}

impl Subscription {
    /// Event type this subscription listens to
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Remove just this listener
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.event_type, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.event_type)
            .field("id", &self.id)
            .finish()
    }
}
