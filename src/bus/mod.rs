//! Dashboard event fan-out.
//!
//! An injectable publish/subscribe channel carrying [`DashboardEvent`]s
//! between independently mounted UI widgets. Construct one bus at process
//! start and hand it around by `Arc`; tests build their own isolated
//! instances.
//!
//! Dispatch is synchronous and in subscription order. `publish` snapshots the
//! subscriber list before iterating, so a handler may unsubscribe itself (or
//! anyone else) mid-dispatch: the current event still reaches every handler
//! in the snapshot, and removals take effect from the next publish. There is
//! no replay buffer: events published before a subscriber attaches are gone
//! for that subscriber. Handlers are expected to be fast UI-state updates; a
//! handler that sub-publishes must not do so unconditionally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened, from the dashboard's point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    MacroUpdate,
    View,
    SystemAlert,
    CheckInLogged,
    PhotoUploaded,
    AdviceReady,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEvent {
    pub kind: EventKind,
    pub subject: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl DashboardEvent {
    /// Event stamped with the current time.
    #[must_use]
    pub fn now(kind: EventKind, subject: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

pub type SubscriberId = u64;

type Handler = std::sync::Arc<dyn Fn(&DashboardEvent) + Send + Sync>;

pub struct EventBus {
    subscribers: Mutex<Vec<(SubscriberId, Handler)>>,
    next_id: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Attach a handler. The returned id must be passed to [`unsubscribe`]
    /// when the owning component unmounts; stale handlers are never collected
    /// automatically.
    ///
    /// [`unsubscribe`]: EventBus::unsubscribe
    pub fn subscribe<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .expect("subscriber list lock poisoned")
            .push((id, std::sync::Arc::new(handler)));
        id
    }

    /// Detach a handler. Returns false when the id was already removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("subscriber list lock poisoned");
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Deliver an event to every current subscriber, in subscription order.
    pub fn publish(&self, event: &DashboardEvent) {
        let snapshot: Vec<Handler> = {
            let subscribers = self
                .subscribers
                .lock()
                .expect("subscriber list lock poisoned");
            subscribers.iter().map(|(_, h)| h.clone()).collect()
        };
        tracing::trace!(kind = %event.kind, subject = %event.subject, handlers = snapshot.len(), "dispatching dashboard event");
        for handler in snapshot {
            handler(event);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber list lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardEvent, EventBus, EventKind};
    use std::sync::{Arc, Mutex, OnceLock};

    fn event() -> DashboardEvent {
        DashboardEvent::now(EventKind::MacroUpdate, "athlete-7", "calories 2400 -> 2200")
    }

    #[test]
    fn handlers_run_in_subscription_order_every_time() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["A", "B", "C"] {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| order.lock().unwrap().push(label));
        }

        for _ in 0..3 {
            bus.publish(&event());
        }
        assert_eq!(
            *order.lock().unwrap(),
            vec!["A", "B", "C", "A", "B", "C", "A", "B", "C"]
        );
    }

    #[test]
    fn handler_unsubscribing_itself_does_not_starve_later_handlers() {
        let bus = Arc::new(EventBus::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let a_id: Arc<OnceLock<u64>> = Arc::new(OnceLock::new());
        let id = {
            let bus = Arc::clone(&bus);
            let order = Arc::clone(&order);
            let a_id = Arc::clone(&a_id);
            bus.clone().subscribe(move |_| {
                order.lock().unwrap().push("A");
                bus.unsubscribe(*a_id.get().unwrap());
            })
        };
        a_id.set(id).unwrap();

        for label in ["B", "C"] {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| order.lock().unwrap().push(label));
        }

        bus.publish(&event());
        // B and C still saw the event A was mid-handling.
        assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);

        bus.publish(&event());
        // A is gone from subsequent dispatches.
        assert_eq!(
            *order.lock().unwrap(),
            vec!["A", "B", "C", "B", "C"]
        );
    }

    #[test]
    fn handler_subscribing_mid_dispatch_sees_only_later_events() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(Mutex::new(0u32));

        {
            let bus = Arc::clone(&bus);
            let count = Arc::clone(&count);
            bus.clone().subscribe(move |_| {
                let count = Arc::clone(&count);
                bus.subscribe(move |_| *count.lock().unwrap() += 1);
            });
        }

        bus.publish(&event());
        assert_eq!(*count.lock().unwrap(), 0);

        bus.publish(&event());
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let bus = EventBus::new();
        bus.publish(&event());

        let seen = Arc::new(Mutex::new(0u32));
        let seen_in_handler = Arc::clone(&seen);
        bus.subscribe(move |_| *seen_in_handler.lock().unwrap() += 1);

        assert_eq!(*seen.lock().unwrap(), 0);
        bus.publish(&event());
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn unsubscribe_unknown_id_is_a_noop() {
        let bus = EventBus::new();
        assert!(!bus.unsubscribe(42));

        let id = bus.subscribe(|_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn event_serde_round_trip() {
        let original = event();
        let json = serde_json::to_string(&original).unwrap();
        let back: DashboardEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
