//! Synchronous in-process publish/subscribe.

use super::event::{Event, EventKind};
use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn(&Event) -> anyhow::Result<()>>;

struct Entry {
    id: u64,
    kind: Option<EventKind>,
    listener: Listener,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Event bus owned by one pipeline run.
///
/// Listeners run synchronously, in subscription order. A listener that
/// returns an error or panics is logged and skipped; publishing never fails.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Listeners>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.inner.borrow().entries.len())
            .finish()
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<Listeners>>,
}

impl Subscription {
    /// Remove the listener. A no-op when the bus is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.borrow_mut().entries.retain(|e| e.id != self.id);
        }
    }
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of event.
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&Event) -> anyhow::Result<()> + 'static,
    {
        self.add(Some(kind), Rc::new(listener))
    }

    /// Listen to every event.
    pub fn subscribe_all<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Event) -> anyhow::Result<()> + 'static,
    {
        self.add(None, Rc::new(listener))
    }

    fn add(&self, kind: Option<EventKind>, listener: Listener) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(Entry { id, kind, listener });
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Deliver `event` to every matching listener.
    pub fn publish(&self, event: Event) {
        let kind = event.kind();
        tracing::trace!("event {}", kind);

        // Snapshot so listeners may (un)subscribe while being called
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind.map_or(true, |k| k == kind))
            .map(|e| Rc::clone(&e.listener))
            .collect();

        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!("Listener for '{}' failed: {:#}", kind, err);
                }
                Err(_) => {
                    tracing::warn!("Listener for '{}' panicked", kind);
                }
            }
        }
    }
}
