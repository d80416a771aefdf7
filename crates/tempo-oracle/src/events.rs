//! Oracle notifications.
//!
//! Events are broadcast to any number of subscribers. They are observational
//! only: nothing in the oracle waits on or depends on their delivery, and
//! emitting with no subscriber attached is not an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// A notification emitted by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OracleEvent {
    /// An admin parameter was changed.
    ConfigChanged {
        /// Parameter name.
        parameter: String,
        /// New value, rendered as text.
        value: String,
    },
    /// An update was committed.
    UpdateCompleted {
        /// Unscaled average after the update.
        average: u128,
        /// Number of committed updates.
        update_count: u64,
        /// Oracle time of the update.
        timestamp: u64,
    },
}

/// Broadcast channel for [`OracleEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OracleEvent>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: OracleEvent) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OracleEvent> {
        self.sender.subscribe()
    }

    /// Number of events emitted so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(OracleEvent::ConfigChanged {
            parameter: "max_window_size".to_string(),
            value: "900".to_string(),
        });

        let event = rx.try_recv().expect("receive event");
        assert!(matches!(event, OracleEvent::ConfigChanged { ref parameter, .. } if parameter == "max_window_size"));
        assert_eq!(bus.sequence(), 1);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::default();
        bus.emit(OracleEvent::UpdateCompleted {
            average: 1,
            update_count: 1,
            timestamp: 0,
        });
        assert_eq!(bus.sequence(), 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = OracleEvent::UpdateCompleted {
            average: 35,
            update_count: 5,
            timestamp: 400,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "update_completed");
        assert_eq!(json["update_count"], 5);
    }
}
