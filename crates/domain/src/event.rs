//! Event — an immutable record of something the engine did.
//!
//! Events are produced by the application layer when commands apply or fail
//! and when schedules are added, fire, or are cancelled.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, EventId};
use crate::time::{now, Timestamp};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CommandApplied,
    CommandRejected,
    ScheduleAdded,
    ScheduleFired,
    ScheduleFailed,
    RevertScheduled,
    SchedulesCancelled,
}

/// A domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub device_id: Option<DeviceId>,
    pub command: Option<String>,
    pub timestamp: Timestamp,
    /// Free-form details: values, trigger time, error message.
    pub data: serde_json::Value,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind, device_id: Option<DeviceId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            kind,
            device_id,
            command: None,
            timestamp: now(),
            data,
        }
    }

    /// Attach the command identifier the event is about.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_event_with_command() {
        let event = Event::new(
            EventKind::CommandApplied,
            Some(DeviceId::from("lamp")),
            serde_json::json!({"values": []}),
        )
        .with_command("on");
        assert_eq!(event.command.as_deref(), Some("on"));
        assert_eq!(event.device_id, Some(DeviceId::from("lamp")));
    }

    #[test]
    fn should_serialize_kind_in_snake_case() {
        let json = serde_json::to_string(&EventKind::RevertScheduled).unwrap();
        assert_eq!(json, "\"revert_scheduled\"");
    }
}
