//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use homesim_domain::error::HomeSimError;
use homesim_domain::event::Event;

use crate::ports::EventPublisher;

/// Channel capacity used by [`InProcessEventBus::default`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Home-wide event fan-out over a tokio [`broadcast`] channel.
///
/// Nobody listening is not an error: the event is dropped. A subscriber
/// that falls more than the capacity behind sees `RecvError::Lagged`.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HomeSimError>> + Send {
        let kind = event.kind;
        if self.sender.send(event).is_err() {
            tracing::trace!(?kind, "event dropped, no subscriber");
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::event::EventKind;
    use homesim_domain::id::DeviceId;

    #[tokio::test]
    async fn should_deliver_event_to_every_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = Event::new(
            EventKind::CommandApplied,
            Some(DeviceId::from("lamp")),
            serde_json::json!({"values": []}),
        )
        .with_command("on");
        let event_id = event.id;

        bus.publish(event).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().id, event_id);
        let received = rx2.recv().await.unwrap();
        assert_eq!(received.id, event_id);
        assert_eq!(received.command.as_deref(), Some("on"));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let event = Event::new(EventKind::ScheduleFired, None, serde_json::json!({}));
        assert!(bus.publish(event).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(Event::new(EventKind::ScheduleAdded, None, serde_json::json!({})))
            .await
            .unwrap();

        let mut rx = bus.subscribe();
        let later = Event::new(EventKind::SchedulesCancelled, None, serde_json::json!({}));
        let later_id = later.id;
        bus.publish(later).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().id, later_id);
    }

    #[tokio::test]
    async fn should_report_lag_to_slow_subscriber() {
        let bus = InProcessEventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(Event::new(EventKind::ScheduleFired, None, serde_json::json!({})))
                .await
                .unwrap();
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ScheduleFired);
    }
}
