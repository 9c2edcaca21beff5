//! Event bus abstraction for decoupled event emission.
//!
//! The engine publishes through this trait so it can run headless, under a
//! renderer, or inside tests without knowing who is listening.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name/topic (e.g., "sequence:status_changed")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it on `topic`.
///
/// Serialization failures are logged and the event is dropped.
pub fn emit_event<E: Serialize>(bus: &dyn EventBus, topic: &str, event: &E) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::warn!(topic, error = %e, "failed to serialize event"),
    }
}

/// Records every emitted event so tests can assert on the sequence.
#[derive(Default)]
pub struct InMemoryEventBus {
    log: Mutex<Vec<EmittedEvent>>,
}

/// One recorded emission.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    /// Position in the log, starting at 0.
    pub seq: usize,
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.log().clone()
    }

    /// Events on `topic`, oldest first.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.log().iter().filter(|e| e.topic == topic).cloned().collect()
    }

    /// Payload of the newest event on `topic`.
    pub fn last_for(&self, topic: &str) -> Option<serde_json::Value> {
        let log = self.log();
        log.iter().rev().find(|e| e.topic == topic).map(|e| e.payload.clone())
    }

    /// Distinct topics in order of first emission.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for event in self.log().iter() {
            if !topics.contains(&event.topic) {
                topics.push(event.topic.clone());
            }
        }
        topics
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    pub fn len(&self) -> usize {
        self.log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        let mut log = self.log();
        let seq = log.len();
        log.push(EmittedEvent {
            seq,
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

/// Event bus that forwards every event to a closure.
pub struct CallbackEventBus {
    callback: Box<dyn Fn(&str, serde_json::Value) + Send + Sync>,
}

impl CallbackEventBus {
    pub fn new(callback: impl Fn(&str, serde_json::Value) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl EventBus for CallbackEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        (self.callback)(topic, payload);
    }
}
