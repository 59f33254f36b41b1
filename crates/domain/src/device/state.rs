//! Device state — named entries holding scalars, mode tables or schedules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::schedule::ScheduleEntry;

/// Closed set of state names a device can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateName {
    On,
    IsPaused,
    IsStopped,
    Brightness,
    Color,
    ThermostatTemperatureSetpoint,
    ThermostatMode,
    ThermostatTemperatureAmbient,
    FanSpeed,
    OpenPercent,
    CurrentVolume,
    IsMuted,
    CurrentInput,
    CurrentApp,
    IsLocked,
    IsDocked,
    ActiveToggles,
    CurrentModes,
    IsRinging,
    Schedules,
    IsArmed,
    HumiditySetting,
}

/// The kind of value a state holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Bool,
    Int,
    Float,
    Text,
    Map,
    List,
}

impl StateName {
    /// Wire name, e.g. `thermostatTemperatureSetpoint`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::IsPaused => "isPaused",
            Self::IsStopped => "isStopped",
            Self::Brightness => "brightness",
            Self::Color => "color",
            Self::ThermostatTemperatureSetpoint => "thermostatTemperatureSetpoint",
            Self::ThermostatMode => "thermostatMode",
            Self::ThermostatTemperatureAmbient => "thermostatTemperatureAmbient",
            Self::FanSpeed => "fanSpeed",
            Self::OpenPercent => "openPercent",
            Self::CurrentVolume => "currentVolume",
            Self::IsMuted => "isMuted",
            Self::CurrentInput => "currentInput",
            Self::CurrentApp => "currentApp",
            Self::IsLocked => "isLocked",
            Self::IsDocked => "isDocked",
            Self::ActiveToggles => "activeToggles",
            Self::CurrentModes => "currentModes",
            Self::IsRinging => "isRinging",
            Self::Schedules => "schedules",
            Self::IsArmed => "isArmed",
            Self::HumiditySetting => "humiditySetting",
        }
    }

    /// The value kind stored under this name.
    #[must_use]
    pub fn kind(self) -> StateKind {
        match self {
            Self::On
            | Self::IsPaused
            | Self::IsStopped
            | Self::IsMuted
            | Self::IsLocked
            | Self::IsDocked
            | Self::IsRinging
            | Self::IsArmed => StateKind::Bool,
            Self::FanSpeed | Self::CurrentVolume | Self::HumiditySetting => StateKind::Int,
            Self::Brightness
            | Self::ThermostatTemperatureSetpoint
            | Self::ThermostatTemperatureAmbient
            | Self::OpenPercent => StateKind::Float,
            Self::Color | Self::ThermostatMode | Self::CurrentInput | Self::CurrentApp => {
                StateKind::Text
            }
            Self::ActiveToggles | Self::CurrentModes => StateKind::Map,
            Self::Schedules => StateKind::List,
        }
    }
}

impl std::fmt::Display for StateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of a mode or toggle table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeValue {
    Flag(bool),
    Text(String),
}

/// A typed state value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Schedules(Vec<ScheduleEntry>),
    Modes(BTreeMap<String, ModeValue>),
}

impl StateValue {
    /// The zero value for a kind, used when a state is created on demand.
    #[must_use]
    pub fn default_for(kind: StateKind) -> Self {
        match kind {
            StateKind::Bool => Self::Bool(false),
            StateKind::Int => Self::Int(0),
            StateKind::Float => Self::Float(0.0),
            StateKind::Text => Self::Text(String::new()),
            StateKind::Map => Self::Modes(BTreeMap::new()),
            StateKind::List => Self::Schedules(Vec::new()),
        }
    }
}

/// One named state of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub name: StateName,
    pub value: StateValue,
    /// Temperature unit token for thermostat states (`C`/`F`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl StateEntry {
    /// Create an entry without a unit.
    #[must_use]
    pub fn new(name: StateName, value: StateValue) -> Self {
        Self {
            name,
            value,
            unit: None,
        }
    }

    /// Attach a unit token.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn mismatch(&self, expected: &'static str) -> StateError {
        StateError {
            state: self.name.to_string(),
            expected,
        }
    }

    /// Read a boolean state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the value is not a boolean.
    pub fn as_bool(&self) -> Result<bool, StateError> {
        match self.value {
            StateValue::Bool(b) => Ok(b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    /// Read a numeric state; integers widen to `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the value is not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Result<f64, StateError> {
        match self.value {
            StateValue::Int(i) => Ok(i as f64),
            StateValue::Float(f) => Ok(f),
            _ => Err(self.mismatch("numeric")),
        }
    }

    /// Read a text state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the value is not text.
    pub fn as_text(&self) -> Result<&str, StateError> {
        match &self.value {
            StateValue::Text(s) => Ok(s),
            _ => Err(self.mismatch("text")),
        }
    }

    /// Mutable access to a mode or toggle table.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the value is not a mapping.
    pub fn modes_mut(&mut self) -> Result<&mut BTreeMap<String, ModeValue>, StateError> {
        let state = self.name.to_string();
        match &mut self.value {
            StateValue::Modes(map) => Ok(map),
            _ => Err(StateError {
                state,
                expected: "mapping",
            }),
        }
    }

    /// Mutable access to the schedule list.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the value is not a list.
    pub fn schedules_mut(&mut self) -> Result<&mut Vec<ScheduleEntry>, StateError> {
        let state = self.name.to_string();
        match &mut self.value {
            StateValue::Schedules(list) => Ok(list),
            _ => Err(StateError {
                state,
                expected: "list",
            }),
        }
    }
}
