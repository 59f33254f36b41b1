//! Device — the record commands and schedules mutate.
//!
//! A device carries an ordered list of named states. Names are unique per
//! device; [`Device::state_or_insert`] is the only way to reach a state
//! mutably, and it creates missing states on demand with a zero value.

mod state;
mod trait_name;

pub use state::{ModeValue, StateEntry, StateKind, StateName, StateValue};
pub use trait_name::TraitName;

use serde::{Deserialize, Serialize};

use crate::error::{HomeSimError, ValidationError};
use crate::id::DeviceId;
use crate::schedule::ScheduleEntry;
use crate::unit::{convert_value_between, round2, TemperatureUnit};

/// An allowed value of a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSetting {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
}

/// A toggle or mode the device declares, with its allowed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleMode {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub settings: Vec<ModeSetting>,
}

impl ToggleMode {
    /// Ids of the allowed settings.
    #[must_use]
    pub fn setting_ids(&self) -> Vec<&str> {
        self.settings.iter().map(|s| s.id.as_str()).collect()
    }
}

/// A simulated smart-home device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub traits: Vec<TraitName>,
    #[serde(default)]
    pub toggles_modes: Vec<ToggleMode>,
    #[serde(default)]
    device_state: Vec<StateEntry>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyId`])
    /// - a state name appears twice ([`ValidationError::DuplicateState`])
    pub fn validate(&self) -> Result<(), HomeSimError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        for (index, entry) in self.device_state.iter().enumerate() {
            if self.device_state[..index]
                .iter()
                .any(|other| other.name == entry.name)
            {
                return Err(ValidationError::DuplicateState(entry.name.to_string()).into());
            }
        }
        Ok(())
    }

    /// Whether the device declares `trait_name`.
    #[must_use]
    pub fn supports(&self, trait_name: TraitName) -> bool {
        self.traits.contains(&trait_name)
    }

    /// All states, in insertion order.
    #[must_use]
    pub fn states(&self) -> &[StateEntry] {
        &self.device_state
    }

    /// Look up a state by name.
    #[must_use]
    pub fn state(&self, name: StateName) -> Option<&StateEntry> {
        self.device_state.iter().find(|s| s.name == name)
    }

    /// Get a state for mutation, creating it with its zero value if absent.
    pub fn state_or_insert(&mut self, name: StateName) -> &mut StateEntry {
        let index = if let Some(index) = self.device_state.iter().position(|s| s.name == name) {
            index
        } else {
            self.device_state
                .push(StateEntry::new(name, StateValue::default_for(name.kind())));
            self.device_state.len() - 1
        };
        &mut self.device_state[index]
    }

    /// Overwrite the value of a state, creating it if needed. The unit is kept.
    pub fn set_state(&mut self, name: StateName, value: StateValue) {
        self.state_or_insert(name).value = value;
    }

    /// Pending and informational schedules; empty when none were ever added.
    #[must_use]
    pub fn schedules(&self) -> &[ScheduleEntry] {
        match self.state(StateName::Schedules).map(|s| &s.value) {
            Some(StateValue::Schedules(list)) => list,
            _ => &[],
        }
    }

    /// The declared toggle or mode with the given id.
    #[must_use]
    pub fn toggle_mode(&self, id: &str) -> Option<&ToggleMode> {
        self.toggles_modes.iter().find(|m| m.id == id)
    }

    /// Ids of every declared toggle or mode.
    #[must_use]
    pub fn toggle_mode_ids(&self) -> Vec<&str> {
        self.toggles_modes.iter().map(|m| m.id.as_str()).collect()
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    names: Vec<String>,
    traits: Vec<TraitName>,
    toggles_modes: Vec<ToggleMode>,
    device_state: Vec<StateEntry>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    #[must_use]
    pub fn with_trait(mut self, trait_name: TraitName) -> Self {
        self.traits.push(trait_name);
        self
    }

    #[must_use]
    pub fn toggle_mode(mut self, toggle_mode: ToggleMode) -> Self {
        self.toggles_modes.push(toggle_mode);
        self
    }

    #[must_use]
    pub fn state(mut self, entry: StateEntry) -> Self {
        self.device_state.push(entry);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] if the id is missing or a state repeats.
    pub fn build(self) -> Result<Device, HomeSimError> {
        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            names: self.names,
            traits: self.traits,
            toggles_modes: self.toggles_modes,
            device_state: self.device_state,
        };
        device.validate()?;
        Ok(device)
    }
}

/// Render states for read paths, adding metric and imperial readings to
/// thermostat temperatures and normalizing their unit to `C`/`F`.
#[must_use]
pub fn enrich_states(states: &[StateEntry]) -> Vec<serde_json::Value> {
    states
        .iter()
        .map(|entry| {
            let mut rendered = serde_json::to_value(entry).unwrap_or(serde_json::Value::Null);
            let is_temperature = matches!(
                entry.name,
                StateName::ThermostatTemperatureSetpoint | StateName::ThermostatTemperatureAmbient
            );
            if let (true, Ok(value)) = (is_temperature, entry.as_f64()) {
                let unit = entry
                    .unit
                    .as_deref()
                    .and_then(TemperatureUnit::from_token)
                    .unwrap_or(TemperatureUnit::Fahrenheit);
                let metric = convert_value_between(value, unit, TemperatureUnit::Celsius);
                let imperial = convert_value_between(value, unit, TemperatureUnit::Fahrenheit);
                if let Some(obj) = rendered.as_object_mut() {
                    obj.insert("value_metric".into(), round2(metric).into());
                    obj.insert("value_imperial".into(), round2(imperial).into());
                    obj.insert("unit".into(), unit.symbol().into());
                }
            }
            rendered
        })
        .collect()
}
