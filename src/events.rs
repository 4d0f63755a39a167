//! Decoupled event bus for session-change notifications.
//!
//! Sign-in and sign-out handlers emit via [`EventBus::emit`]; interested
//! components subscribe via [`EventBus::subscribe`]. Built on
//! [`tokio::sync::broadcast`] so multiple listeners can react
//! independently — there is no ambient global session state anywhere.

use tokio::sync::broadcast;

use crate::auth::Session;

/// Events that flow through the system.
#[derive(Debug, Clone)]
pub enum Event {
    /// The caller's session changed: sign-in carries the new session,
    /// sign-out carries `None`.
    SessionChanged { session: Option<Session> },
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events. Returns a receiver that yields all
    /// future events (does not replay past ones).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
