//! Synchronous event bus.
//!
//! Dispatch happens on the caller's stack. The subscriber list is
//! snapshotted before each dispatch so handlers may emit, subscribe or
//! unsubscribe re-entrantly. Subscriptions added during a dispatch wait for
//! the next emit; subscriptions removed during a dispatch are skipped at once.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::types::{EventGroup, EventKind, StoreEvent};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Exactly one event kind.
    Kind(EventKind),
    /// Every kind in a group.
    Group(EventGroup),
    /// Every event.
    All,
}

impl EventFilter {
    pub fn matches(&self, event: &StoreEvent) -> bool {
        match self {
            EventFilter::Kind(kind) => event.kind() == *kind,
            EventFilter::Group(group) => event.group() == *group,
            EventFilter::All => true,
        }
    }
}

/// Handler invoked for matching events.
///
/// An error return is logged and does not stop dispatch to other handlers.
pub type EventHandler = dyn Fn(&StoreEvent) -> anyhow::Result<()>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Rc<EventHandler>,
}

/// Outcome of a single [`EventBus::emit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Handlers that matched and were called.
    pub invoked: usize,
    /// Handlers among those that returned an error or panicked.
    pub failed: usize,
}

/// Single-threaded publish/subscribe registry for [`StoreEvent`]s.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) -> anyhow::Result<()> + 'static,
    {
        self.register(EventFilter::Kind(kind), Rc::new(handler))
    }

    /// Subscribe to every kind in a group.
    pub fn subscribe_group<F>(&self, group: EventGroup, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) -> anyhow::Result<()> + 'static,
    {
        self.register(EventFilter::Group(group), Rc::new(handler))
    }

    /// Subscribe to every event.
    ///
    /// Runs in registration order alongside kind and group handlers.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) -> anyhow::Result<()> + 'static,
    {
        self.register(EventFilter::All, Rc::new(handler))
    }

    fn register(&self, filter: EventFilter, handler: Rc<EventHandler>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            filter,
            handler,
        });
        debug!(subscription = %id, ?filter, "Subscription added");
        id
    }

    /// Remove a subscription.
    ///
    /// Returns true if the subscription was found and removed. A dispatch
    /// already in progress skips it if it has not run yet.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let len_before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() < len_before;
        if removed {
            debug!(subscription = %id, "Subscription removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    fn is_live(&self, id: SubscriptionId) -> bool {
        self.subscriptions.borrow().iter().any(|s| s.id == id)
    }

    /// Deliver an event to every matching handler, in registration order.
    ///
    /// Handler failures and panics are isolated and counted; nothing is
    /// propagated to the caller.
    pub fn emit(&self, event: StoreEvent) -> Dispatch {
        let targets: Vec<(SubscriptionId, Rc<EventHandler>)> = self
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        trace!(event = %event.name(), handlers = targets.len(), "Dispatching event");

        let mut dispatch = Dispatch::default();
        for (id, handler) in targets {
            // Unsubscribed by an earlier handler of this dispatch.
            if !self.is_live(id) {
                continue;
            }
            dispatch.invoked += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    dispatch.failed += 1;
                    warn!(
                        subscription = %id,
                        event = %event.name(),
                        error = %e,
                        "Event handler failed"
                    );
                }
                Err(payload) => {
                    dispatch.failed += 1;
                    warn!(
                        subscription = %id,
                        event = %event.name(),
                        panic = panic_message(payload.as_ref()),
                        "Event handler panicked"
                    );
                }
            }
        }
        dispatch
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
