//! Synchronous publish/subscribe hub.
//!
//! Delivery is synchronous and in subscription order: `publish` returns only
//! after every handler registered for the event's topic has run. Publication
//! iterates a snapshot of the handler list, so a handler that subscribes or
//! unsubscribes mid-delivery affects later publications, never the current
//! one. Handlers must be fast; anything slow belongs behind a channel on the
//! subscriber's side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{BattleEvent, Topic};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&BattleEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    handlers: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
}

/// Cloneable event hub shared between the session and its observers.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers a handler for one topic. Handlers for the same topic run in
    /// subscription order.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&BattleEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .handlers
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        for handlers in self.lock().handlers.values_mut() {
            handlers.retain(|(existing, _)| *existing != id);
        }
    }

    /// Delivers `event` to every handler of its topic, in subscription
    /// order, before returning.
    pub fn publish(&self, event: &BattleEvent) {
        let snapshot: Vec<Handler> = {
            let registry = self.lock();
            match registry.handlers.get(&event.topic()) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };
        // The lock is released before dispatch so handlers may re-enter the
        // bus.
        for handler in snapshot {
            handler(event);
        }
    }

    /// Drops every subscription. Called on battle restart so observers from
    /// the previous run cannot leak into the next one.
    pub fn clear(&self) {
        self.lock().handlers.clear();
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.lock()
            .handlers
            .get(&topic)
            .map_or(0, |handlers| handlers.len())
    }
}
