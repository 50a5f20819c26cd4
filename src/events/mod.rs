//! Lifecycle events.
//!
//! The pipeline never writes to the terminal or the logger for user-facing
//! output. It publishes [`Event`]s on an [`EventBus`] that belongs to the
//! run, and observers such as the [`ConsoleReporter`] subscribe to it.
//!
//! # Example
//!
//! ```
//! use preset::events::{Event, EventBus, EventKind, EventLog};
//!
//! let bus = EventBus::new();
//! let log = EventLog::attach(&bus);
//!
//! bus.publish(Event::ContextBuilt);
//! assert_eq!(log.count(EventKind::ContextBuilt), 1);
//! ```

pub mod bus;
pub mod event;
pub mod reporter;

pub use bus::{EventBus, Subscription};
pub use event::{Event, EventKind, MessagePhase};
pub use reporter::ConsoleReporter;

use std::cell::RefCell;
use std::rc::Rc;

/// Records every event published on a bus.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    /// Subscribe a new log to `bus`.
    pub fn attach(bus: &EventBus) -> Self {
        let log = Self::default();
        let events = Rc::clone(&log.events);
        bus.subscribe_all(move |event| {
            events.borrow_mut().push(event.clone());
            Ok(())
        });
        log
    }

    /// Copy of all recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Names of all recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Event::name).collect()
    }

    /// Number of recorded events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }
}
