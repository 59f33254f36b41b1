//! Command service — apply commands now or store them for later.

use homesim_domain::command::{self, CommandName, Value};
use homesim_domain::device::{enrich_states, Device, StateName};
use homesim_domain::error::HomeSimError;
use homesim_domain::event::{Event, EventKind};
use homesim_domain::id::DeviceId;
use homesim_domain::schedule::{
    self, add_duration, add_schedule, parse_duration, revert_for, ScheduleEntry,
    ScheduleTiming,
};
use homesim_domain::time::{now, Timestamp};

use super::load_device;
use crate::ports::{DeviceRepository, EventPublisher};

/// What [`CommandService::run`] did to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Applied now; `revert` is the entry undoing it when a duration was given.
    Applied {
        device_id: DeviceId,
        revert: Option<ScheduleEntry>,
    },
    /// Stored for later.
    Scheduled {
        device_id: DeviceId,
        entry: ScheduleEntry,
    },
    /// Pending schedules were dropped.
    SchedulesCancelled { device_id: DeviceId, removed: usize },
}

/// Application service for immediate and deferred commands.
pub struct CommandService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> CommandService<R, P>
where
    R: DeviceRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Apply `command` to one device right away and return the updated device.
    ///
    /// # Errors
    ///
    /// See [`CommandService::run`].
    pub async fn execute(
        &self,
        id: &DeviceId,
        command: &str,
        values: &[String],
    ) -> Result<Device, HomeSimError> {
        self.run(std::slice::from_ref(id), command, values, &ScheduleTiming::default(), now())
            .await?;
        load_device(&self.repo, id).await
    }

    /// Apply or schedule `command` on every device in `ids`.
    ///
    /// When the timing names a time of day, a date or a delay, the command is
    /// stored on each device; otherwise it is applied now, and a duration
    /// schedules its revert. Either every device is updated or none is.
    ///
    /// # Errors
    ///
    /// - [`HomeSimError::UnsupportedCommand`] for an unknown command
    /// - [`HomeSimError::NotFound`] when a device does not exist
    /// - [`HomeSimError::UnsupportedTrait`] when a device lacks the command's trait
    /// - value, timing and state errors from the engine
    #[tracing::instrument(skip(self, values, timing, now), fields(devices = ids.len()))]
    pub async fn run(
        &self,
        ids: &[DeviceId],
        command: &str,
        values: &[String],
        timing: &ScheduleTiming,
        now: Timestamp,
    ) -> Result<Vec<RunOutcome>, HomeSimError> {
        match self.stage(ids, command, values, timing, now).await {
            Ok(staged) => {
                let mut outcomes = Vec::with_capacity(staged.len());
                for (device, outcome) in staged {
                    self.repo.update(device).await?;
                    self.announce(&outcome, command, values).await;
                    outcomes.push(outcome);
                }
                Ok(outcomes)
            }
            Err(err) => {
                tracing::debug!(command, error = %err, "command rejected");
                for id in ids {
                    let event = Event::new(
                        EventKind::CommandRejected,
                        Some(id.clone()),
                        serde_json::json!({ "values": values, "error": err.to_string() }),
                    )
                    .with_command(command);
                    let _ = self.publisher.publish(event).await;
                }
                Err(err)
            }
        }
    }

    /// States of a device, with metric and imperial readings for temperatures.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when the device does not exist.
    pub async fn device_states(
        &self,
        id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, HomeSimError> {
        let device = load_device(&self.repo, id).await?;
        Ok(enrich_states(device.states()))
    }

    /// Build the updated copy of every device without touching the store.
    async fn stage(
        &self,
        ids: &[DeviceId],
        command: &str,
        values: &[String],
        timing: &ScheduleTiming,
        now: Timestamp,
    ) -> Result<Vec<(Device, RunOutcome)>, HomeSimError> {
        let command: CommandName = command.parse()?;
        let timing = effective_timing(command, values, timing);
        parse_duration(timing.duration())?;

        let mut devices = Vec::with_capacity(ids.len());
        for id in ids {
            let device = load_device(&self.repo, id).await?;
            if !command.traits().iter().any(|t| device.supports(*t)) {
                return Err(HomeSimError::UnsupportedTrait {
                    device: id.to_string(),
                    trait_name: command.primary_trait().to_string(),
                });
            }
            devices.push(device);
        }

        let mut staged = Vec::with_capacity(devices.len());
        for mut device in devices {
            let device_id = device.id.clone();
            let outcome = if timing.is_deferred() {
                let entry = add_schedule(&mut device, command, values.to_vec(), &timing, now)?;
                RunOutcome::Scheduled { device_id, entry }
            } else {
                command::apply(&mut device, command, values)?;
                if command == CommandName::CancelSchedules {
                    let removed = schedule::cancel_schedules(&mut device);
                    RunOutcome::SchedulesCancelled { device_id, removed }
                } else {
                    let revert = schedule_revert(&mut device, command, &timing, now)?;
                    RunOutcome::Applied { device_id, revert }
                }
            };
            staged.push((device, outcome));
        }
        Ok(staged)
    }

    async fn announce(&self, outcome: &RunOutcome, command: &str, values: &[String]) {
        let (kind, device_id, data) = match outcome {
            RunOutcome::Applied { device_id, revert } => {
                tracing::debug!(device = %device_id, command, "command applied");
                if let Some(revert) = revert {
                    tracing::info!(
                        device = %device_id,
                        action = %revert.action,
                        start_time = %revert.start_time,
                        "revert scheduled"
                    );
                }
                (
                    EventKind::CommandApplied,
                    device_id,
                    serde_json::json!({ "values": values, "revert": revert }),
                )
            }
            RunOutcome::Scheduled { device_id, entry } => {
                tracing::info!(
                    device = %device_id,
                    command,
                    start_time = %entry.start_time,
                    "command scheduled"
                );
                (
                    EventKind::ScheduleAdded,
                    device_id,
                    serde_json::json!({ "entry": entry }),
                )
            }
            RunOutcome::SchedulesCancelled { device_id, removed } => {
                tracing::info!(device = %device_id, removed, "schedules cancelled");
                (
                    EventKind::SchedulesCancelled,
                    device_id,
                    serde_json::json!({ "removed": removed }),
                )
            }
        };
        let event = Event::new(kind, Some(device_id.clone()), data).with_command(command);
        let _ = self.publisher.publish(event).await;
    }
}

/// Light effects with a built-in duration revert after that many seconds
/// unless the caller gave an explicit duration.
fn effective_timing(
    command: CommandName,
    values: &[String],
    timing: &ScheduleTiming,
) -> ScheduleTiming {
    let mut timing = timing.clone();
    if command == CommandName::SetLightEffectWithDuration && timing.duration().is_none() {
        let shape = command::spec(command).shape;
        if let Ok(Value::LightEffectDuration { seconds, .. }) = shape.parse(command, values) {
            timing.duration = Some(format!("{seconds}s"));
        }
    }
    timing
}

fn schedule_revert(
    device: &mut Device,
    command: CommandName,
    timing: &ScheduleTiming,
    now: Timestamp,
) -> Result<Option<ScheduleEntry>, HomeSimError> {
    if timing.duration().is_none() {
        return Ok(None);
    }
    let at = add_duration(now, timing.duration())?;
    let Some(revert) = revert_for(command, at) else {
        tracing::debug!(command = %command, "duration ignored, command has no inverse");
        return Ok(None);
    };
    device
        .state_or_insert(StateName::Schedules)
        .schedules_mut()?
        .push(revert.clone());
    Ok(Some(revert))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone, Utc};
    use homesim_domain::device::{StateEntry, StateValue, TraitName};

    use crate::event_bus::InProcessEventBus;
    use crate::home::Home;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn lamp(id: &str) -> Device {
        Device::builder()
            .id(id)
            .with_trait(TraitName::OnOff)
            .with_trait(TraitName::LightEffects)
            .with_trait(TraitName::CancelSchedules)
            .state(StateEntry::new(StateName::On, StateValue::Bool(false)))
            .build()
            .unwrap()
    }

    type TestService = CommandService<Arc<Home>, Arc<InProcessEventBus>>;

    fn service() -> (TestService, Arc<Home>, Arc<InProcessEventBus>) {
        let home = Arc::new(Home::with_devices(vec![lamp("lamp-1"), lamp("lamp-2")]));
        let bus = Arc::new(InProcessEventBus::new(16));
        (CommandService::new(Arc::clone(&home), Arc::clone(&bus)), home, bus)
    }

    fn ids(raw: &[&str]) -> Vec<DeviceId> {
        raw.iter().map(|id| DeviceId::from(*id)).collect()
    }

    fn is_on(device: &Device) -> bool {
        device.state(StateName::On).unwrap().as_bool().unwrap()
    }

    #[tokio::test]
    async fn should_apply_command_immediately() {
        let (service, _, bus) = service();
        let mut rx = bus.subscribe();
        let device = service
            .execute(&DeviceId::from("lamp-1"), "on", &[])
            .await
            .unwrap();
        assert!(is_on(&device));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::CommandApplied);
        assert_eq!(event.command.as_deref(), Some("on"));
    }

    #[tokio::test]
    async fn should_reject_device_without_trait() {
        let (service, _, _) = service();
        let err = service
            .execute(&DeviceId::from("lamp-1"), "set_volume_level", &["10".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HomeSimError::UnsupportedTrait { ref trait_name, .. } if trait_name == "Volume"
        ));
    }

    #[tokio::test]
    async fn should_report_unknown_device() {
        let (service, _, _) = service();
        let err = service
            .execute(&DeviceId::from("ghost"), "on", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HomeSimError::NotFound(_)));
    }

    #[tokio::test]
    async fn should_leave_every_device_untouched_when_one_fails() {
        let (service, home, bus) = service();
        let mut rx = bus.subscribe();
        let err = service
            .run(&ids(&["lamp-1", "ghost"]), "on", &[], &ScheduleTiming::default(), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, HomeSimError::NotFound(_)));
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        assert!(!is_on(&lamp));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::CommandRejected);
    }

    #[tokio::test]
    async fn should_store_deferred_command_on_every_device() {
        let (service, home, _) = service();
        let timing = ScheduleTiming {
            delay: Some("30m".to_string()),
            ..ScheduleTiming::default()
        };
        let outcomes = service
            .run(&ids(&["lamp-1", "lamp-2"]), "on", &[], &timing, t0())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], RunOutcome::Scheduled { .. }));
        for device in home.get_all().await.unwrap() {
            assert!(!is_on(&device));
            assert_eq!(device.schedules().len(), 1);
            assert_eq!(
                device.schedules()[0].fire_time(),
                Some(t0() + TimeDelta::minutes(30))
            );
        }
    }

    #[tokio::test]
    async fn should_schedule_revert_for_immediate_command_with_duration() {
        let (service, home, _) = service();
        let timing = ScheduleTiming {
            duration: Some("5m".to_string()),
            ..ScheduleTiming::default()
        };
        let outcomes = service
            .run(&ids(&["lamp-1"]), "on", &[], &timing, t0())
            .await
            .unwrap();
        let RunOutcome::Applied { revert: Some(revert), .. } = &outcomes[0] else {
            panic!("expected a revert");
        };
        assert_eq!(revert.action, "off");
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        assert!(is_on(&lamp));
        assert_eq!(lamp.schedules(), &[revert.clone()]);
    }

    #[tokio::test]
    async fn should_use_light_effect_seconds_as_duration() {
        let (service, home, _) = service();
        service
            .run(
                &ids(&["lamp-1"]),
                "set_light_effect_with_duration",
                &["sleep".to_string(), "90".to_string()],
                &ScheduleTiming::default(),
                t0(),
            )
            .await
            .unwrap();
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        let pending = lamp.schedules();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, "set_mode");
        assert_eq!(pending[0].fire_time(), Some(t0() + TimeDelta::seconds(90)));
    }

    #[tokio::test]
    async fn should_cancel_schedules_through_run() {
        let (service, home, _) = service();
        let timing = ScheduleTiming {
            delay: Some("1h".to_string()),
            ..ScheduleTiming::default()
        };
        service
            .run(&ids(&["lamp-1"]), "off", &[], &timing, t0())
            .await
            .unwrap();
        let outcomes = service
            .run(
                &ids(&["lamp-1"]),
                "cancel_schedules",
                &[],
                &ScheduleTiming::default(),
                t0(),
            )
            .await
            .unwrap();
        assert_eq!(
            outcomes,
            vec![RunOutcome::SchedulesCancelled {
                device_id: DeviceId::from("lamp-1"),
                removed: 1
            }]
        );
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        assert!(lamp.schedules().is_empty());
    }

    #[tokio::test]
    async fn should_reject_malformed_duration_before_mutating() {
        let (service, home, _) = service();
        let timing = ScheduleTiming {
            duration: Some("five minutes".to_string()),
            ..ScheduleTiming::default()
        };
        let err = service
            .run(&ids(&["lamp-1"]), "on", &[], &timing, t0())
            .await
            .unwrap_err();
        assert!(matches!(err, HomeSimError::Duration(_)));
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        assert!(!is_on(&lamp));
    }

    #[tokio::test]
    async fn should_reject_duration_leaving_the_calendar() {
        let (service, home, _) = service();
        for timing in [
            ScheduleTiming {
                duration: Some("9999999999h".to_string()),
                ..ScheduleTiming::default()
            },
            ScheduleTiming {
                delay: Some("9999999999h".to_string()),
                ..ScheduleTiming::default()
            },
            ScheduleTiming {
                delay: Some("1m".to_string()),
                duration: Some("9999999999h".to_string()),
                ..ScheduleTiming::default()
            },
        ] {
            let err = service
                .run(&ids(&["lamp-1"]), "on", &[], &timing, t0())
                .await
                .unwrap_err();
            assert!(matches!(err, HomeSimError::Duration(_)), "{timing:?}");
        }
        let lamp = home.get_by_id(&DeviceId::from("lamp-1")).await.unwrap().unwrap();
        assert!(!is_on(&lamp));
        assert!(lamp.schedules().is_empty());
    }

    #[tokio::test]
    async fn should_enrich_temperature_states() {
        let thermostat = Device::builder()
            .id("thermo")
            .with_trait(TraitName::TemperatureSetting)
            .state(
                StateEntry::new(StateName::ThermostatTemperatureSetpoint, StateValue::Float(20.0))
                    .with_unit("C"),
            )
            .build()
            .unwrap();
        let service = CommandService::new(
            Home::with_devices(vec![thermostat]),
            InProcessEventBus::new(4),
        );
        let states = service.device_states(&DeviceId::from("thermo")).await.unwrap();
        assert_eq!(states[0]["value_imperial"], 68.0);
        assert_eq!(states[0]["value_metric"], 20.0);
    }
}
