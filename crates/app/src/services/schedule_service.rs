//! Schedule service — advance the clock, view and cancel pending entries.

use homesim_domain::error::HomeSimError;
use homesim_domain::event::{Event, EventKind};
use homesim_domain::id::DeviceId;
use homesim_domain::schedule::{self, Firing, ScheduleEntry, TickReport};
use homesim_domain::time::Timestamp;

use super::load_device;
use crate::ports::{DeviceRepository, EventPublisher};

/// Application service driving deferred commands.
///
/// Ticks read every device and write back only those that changed, so
/// callers must not run commands concurrently with a tick.
pub struct ScheduleService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> ScheduleService<R, P>
where
    R: DeviceRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Fire every entry due at `now` across the home.
    ///
    /// Failed firings are logged and reported, never returned as errors.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self, now: Timestamp) -> Result<TickReport, HomeSimError> {
        let mut devices = self.repo.get_all().await?;
        let report = schedule::tick(devices.iter_mut(), now);
        if report.is_empty() {
            return Ok(report);
        }

        for device in devices {
            if report
                .firings
                .iter()
                .any(|f| f.device_id == device.id.as_str())
            {
                self.repo.update(device).await?;
            }
        }
        for firing in &report.firings {
            self.announce(firing).await;
        }
        Ok(report)
    }

    /// Pending and informational schedules of a device, in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when the device does not exist.
    pub async fn view_schedules(
        &self,
        id: &DeviceId,
    ) -> Result<Vec<ScheduleEntry>, HomeSimError> {
        let device = load_device(&self.repo, id).await?;
        Ok(device.schedules().to_vec())
    }

    /// Drop every schedule of a device, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when the device does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_schedules(&self, id: &DeviceId) -> Result<usize, HomeSimError> {
        let mut device = load_device(&self.repo, id).await?;
        let removed = schedule::cancel_schedules(&mut device);
        if removed > 0 {
            self.repo.update(device).await?;
        }
        tracing::info!(device = %id, removed, "schedules cancelled");
        let event = Event::new(
            EventKind::SchedulesCancelled,
            Some(id.clone()),
            serde_json::json!({ "removed": removed }),
        )
        .with_command("cancel_schedules");
        let _ = self.publisher.publish(event).await;
        Ok(removed)
    }

    async fn announce(&self, firing: &Firing) {
        let device_id = DeviceId::from(firing.device_id.as_str());
        let action = firing.entry.action.as_str();
        let event = match &firing.outcome {
            Ok(()) => {
                tracing::info!(
                    device = %device_id,
                    action,
                    start_time = %firing.entry.start_time,
                    "schedule fired"
                );
                Event::new(
                    EventKind::ScheduleFired,
                    Some(device_id.clone()),
                    serde_json::json!({ "entry": firing.entry }),
                )
            }
            Err(err) => {
                tracing::warn!(device = %device_id, action, error = %err.source, "schedule failed");
                Event::new(
                    EventKind::ScheduleFailed,
                    Some(device_id.clone()),
                    serde_json::json!({ "entry": firing.entry, "error": err.source.to_string() }),
                )
            }
        };
        let _ = self.publisher.publish(event.with_command(action)).await;

        if let Some(revert) = &firing.revert {
            tracing::info!(
                device = %device_id,
                action = %revert.action,
                start_time = %revert.start_time,
                "revert scheduled"
            );
            let event = Event::new(
                EventKind::RevertScheduled,
                Some(device_id),
                serde_json::json!({ "entry": revert }),
            )
            .with_command(revert.action.as_str());
            let _ = self.publisher.publish(event).await;
        }
    }
}
