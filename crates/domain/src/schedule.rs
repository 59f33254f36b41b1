//! Scheduler — deferred commands stored on the device and fired by [`tick`].
//!
//! Entries live in the device's `schedules` state. An entry whose
//! `start_time` carries no UTC offset is informational and never fires.

mod timing;

pub use timing::{add_duration, calculate_start_time, parse_duration, AmPm, ScheduleTiming};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{self, CommandName, LIGHT_EFFECT_MODE};
use crate::device::{Device, StateName, StateValue};
use crate::error::{HomeSimError, ScheduleApplicationError};
use crate::time::Timestamp;

/// A deferred command as persisted in device state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub action: String,
    #[serde(default)]
    pub values: Vec<String>,
    /// ISO-8601 trigger time.
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ScheduleEntry {
    #[must_use]
    pub fn new(
        action: CommandName,
        values: Vec<String>,
        start_time: Timestamp,
        duration: Option<String>,
    ) -> Self {
        Self {
            action: action.as_str().to_string(),
            values,
            start_time: start_time.to_rfc3339(),
            duration,
        }
    }

    /// The trigger time, or `None` for informational entries.
    #[must_use]
    pub fn fire_time(&self) -> Option<Timestamp> {
        let text = self.start_time.trim();
        DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z"))
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%MZ")
                    .ok()
                    .map(|t| t.and_utc())
            })
    }

    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.fire_time().is_some_and(|t| t <= now)
    }
}

/// The entry undoing `action` at `at`, for commands that have an inverse.
#[must_use]
pub fn revert_for(action: CommandName, at: Timestamp) -> Option<ScheduleEntry> {
    let (inverse, values) = match action {
        CommandName::On => (CommandName::Off, vec![]),
        CommandName::Off => (CommandName::On, vec![]),
        CommandName::ToggleOnOff => (CommandName::ToggleOnOff, vec![]),
        CommandName::SetLightEffect | CommandName::SetLightEffectWithDuration => (
            CommandName::SetMode,
            vec![LIGHT_EFFECT_MODE.to_string(), String::new()],
        ),
        _ => return None,
    };
    Some(ScheduleEntry::new(inverse, values, at, None))
}

/// Append a deferred command to the device's schedules.
///
/// Arguments are validated now so a malformed schedule is rejected
/// instead of failing silently when it fires.
///
/// # Errors
///
/// Returns [`HomeSimError::Value`] for arguments that do not fit the
/// command, [`HomeSimError::Time`] or [`HomeSimError::Duration`] for bad
/// timing, and [`HomeSimError::State`] when `schedules` is not a list.
pub fn add_schedule(
    device: &mut Device,
    command: CommandName,
    values: Vec<String>,
    timing: &ScheduleTiming,
    now: Timestamp,
) -> Result<ScheduleEntry, HomeSimError> {
    let shape = command::spec(command).shape;
    shape.parse(command, shape.effective_values(&values))?;
    let start = calculate_start_time(now, timing)?;
    add_duration(start, timing.duration())?;
    let entry = ScheduleEntry::new(command, values, start, timing.duration().map(String::from));
    device
        .state_or_insert(StateName::Schedules)
        .schedules_mut()?
        .push(entry.clone());
    Ok(entry)
}

/// Remove every schedule from the device, returning how many there were.
pub fn cancel_schedules(device: &mut Device) -> usize {
    let removed = device.schedules().len();
    if removed > 0 {
        device.set_state(StateName::Schedules, StateValue::Schedules(Vec::new()));
    }
    removed
}

/// A schedule entry that came due during a tick.
#[derive(Debug)]
pub struct Firing {
    pub device_id: String,
    pub entry: ScheduleEntry,
    /// Revert entry added because the fired entry carried a duration.
    pub revert: Option<ScheduleEntry>,
    pub outcome: Result<(), ScheduleApplicationError>,
}

/// Everything a tick did, across all devices.
#[derive(Debug, Default)]
pub struct TickReport {
    pub firings: Vec<Firing>,
}

impl TickReport {
    /// Failed firings, in the order they happened.
    pub fn failures(&self) -> impl Iterator<Item = &ScheduleApplicationError> {
        self.firings.iter().filter_map(|f| f.outcome.as_ref().err())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.firings.is_empty()
    }
}

fn fire(device: &mut Device, entry: &ScheduleEntry) -> Result<CommandName, HomeSimError> {
    let command: CommandName = entry.action.parse()?;
    let shape = command::spec(command).shape;
    command::apply(device, command, shape.effective_values(&entry.values))?;
    Ok(command)
}

fn revert_entry(
    entry: &ScheduleEntry,
    fired_at: Timestamp,
) -> Result<Option<ScheduleEntry>, HomeSimError> {
    let Some(duration) = entry.duration.as_deref().map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    let at = add_duration(fired_at, Some(duration))?;
    let command: CommandName = entry.action.parse()?;
    Ok(revert_for(command, at))
}

/// Fire every due entry of one device.
///
/// Failures are captured per entry and never propagate; failed entries are
/// still removed. Removals and reverts are applied after all due entries
/// have been visited, so a revert never fires in the tick that created it.
pub fn tick_device(device: &mut Device, now: Timestamp) -> Vec<Firing> {
    let pending = device.schedules().to_vec();
    let mut firings = Vec::new();
    let mut fired = Vec::new();

    for (index, entry) in pending.iter().enumerate() {
        let Some(fire_time) = entry.fire_time().filter(|t| *t <= now) else {
            continue;
        };
        fired.push(index);

        let mut outcome = fire(device, entry).map(|_| ());
        let revert = match revert_entry(entry, fire_time) {
            Ok(revert) => revert,
            Err(err) => {
                outcome = outcome.and(Err(err));
                None
            }
        };
        firings.push(Firing {
            device_id: device.id.to_string(),
            entry: entry.clone(),
            revert,
            outcome: outcome.map_err(|source| ScheduleApplicationError {
                device_id: device.id.to_string(),
                action: entry.action.clone(),
                source,
            }),
        });
    }

    if !fired.is_empty() {
        let remaining = pending
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !fired.contains(index))
            .map(|(_, entry)| entry)
            .chain(firings.iter().filter_map(|f| f.revert.clone()))
            .collect();
        device.set_state(StateName::Schedules, StateValue::Schedules(remaining));
    }
    firings
}

/// Advance the clock to `now` over every device.
pub fn tick<'a>(devices: impl IntoIterator<Item = &'a mut Device>, now: Timestamp) -> TickReport {
    TickReport {
        firings: devices
            .into_iter()
            .flat_map(|device| tick_device(device, now))
            .collect(),
    }
}
