//! Interest events and listener fan-out

use std::sync::Arc;
use vigil_core::EntityId;

/// What just happened between an actor and an interesting object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterestEventKind {
    /// Actor started paying attention to the object
    Start,
    /// Actor stopped paying attention
    Stop,
    /// The selection's scripted action ran to completion
    ActionComplete,
    /// The scripted action was aborted by the action system
    ActionAbort,
    /// The scripted action was canceled
    ActionCancel,
}

/// A single interest event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestEvent {
    /// Event kind
    pub kind: InterestEventKind,
    /// The interested actor
    pub actor: EntityId,
    /// The interesting object
    pub target: EntityId,
}

impl InterestEvent {
    /// Create an event
    pub fn new(kind: InterestEventKind, actor: EntityId, target: EntityId) -> Self {
        Self { kind, actor, target }
    }
}

/// Receiver for interest events.
///
/// Listeners subscribe per interesting-entity id and must not assume any
/// delivery order relative to listeners on other ids.
pub trait InterestListener {
    /// Called for every event involving a subscribed object
    fn on_interest_event(&self, event: &InterestEvent);
}

/// Multimap from interesting-entity id to listeners.
///
/// Listener identity is the `Arc` allocation, so registering the same
/// `Arc` twice for one id is a no-op and unregistering removes every
/// matching pair.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(EntityId, Arc<dyn InterestListener>)>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to events for one object. Idempotent per
    /// (listener, id) pair.
    pub fn register(&mut self, listener: Arc<dyn InterestListener>, target: EntityId) {
        let exists = self
            .listeners
            .iter()
            .any(|(id, l)| *id == target && Arc::ptr_eq(l, &listener));
        if !exists {
            self.listeners.push((target, listener));
        }
    }

    /// Remove every entry matching this exact (listener, id) pair.
    /// Unknown pairs are a no-op.
    pub fn unregister(&mut self, listener: &Arc<dyn InterestListener>, target: EntityId) {
        self.listeners
            .retain(|(id, l)| *id != target || !Arc::ptr_eq(l, listener));
    }

    /// Fan an event out to every listener subscribed to its target
    pub fn notify(&self, event: &InterestEvent) {
        for (id, listener) in &self.listeners {
            if *id == event.target {
                listener.on_interest_event(event);
            }
        }
    }

    /// Drop all subscriptions
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of (listener, id) pairs
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is subscribed
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
