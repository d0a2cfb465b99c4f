//! Event model for the bus.

use serde::{Deserialize, Serialize};

/// Signal kinds carried on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Human-readable log line from a producer.
    Log,
    /// Periodic timer tick from the bus's timer source.
    Timer,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Log => write!(f, "log"),
            Self::Timer => write!(f, "timer"),
        }
    }
}

/// A fire-and-forget bus event. Delivery ordering is owned by the bus,
/// not the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Signal kind, used to select handlers.
    pub kind: EventKind,
    /// Event payload (log text, or the tick instant for timer events).
    pub payload: String,
    /// Producer timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl Event {
    /// Create a log event stamped with the given instant.
    #[must_use]
    pub fn log(message: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            kind: EventKind::Log,
            payload: message.into(),
            timestamp_ms,
        }
    }

    /// Create a timer tick event.
    #[must_use]
    pub fn timer(timestamp_ms: i64) -> Self {
        Self {
            kind: EventKind::Timer,
            payload: timestamp_ms.to_string(),
            timestamp_ms,
        }
    }
}
