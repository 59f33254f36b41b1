//! Seed home — the devices the daemon starts with.

use std::path::Path;

use homesim_domain::device::Device;
use homesim_domain::error::HomeSimError;
use serde::Deserialize;

/// On-disk shape of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl Seed {
    /// Parse and validate a seed from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Parse`] for malformed JSON and
    /// [`SeedError::Invalid`] for the first device failing validation.
    pub fn from_json(content: &str) -> Result<Self, SeedError> {
        let seed: Self = serde_json::from_str(content)?;
        for device in &seed.devices {
            device.validate().map_err(|source| SeedError::Invalid {
                device: device.id.to_string(),
                source,
            })?;
        }
        Ok(seed)
    }

    /// Read a seed file, or an empty home when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Io`] when the file cannot be read, plus any
    /// error from [`Seed::from_json`].
    pub fn load(path: Option<&Path>) -> Result<Self, SeedError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Seed loading errors.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse seed file")]
    Parse(#[from] serde_json::Error),
    #[error("invalid device '{device}' in seed")]
    Invalid {
        device: String,
        #[source]
        source: HomeSimError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::device::{StateName, StateValue, TraitName};

    #[test]
    fn should_load_empty_home_without_path() {
        let seed = Seed::load(None).unwrap();
        assert!(seed.devices.is_empty());
    }

    #[test]
    fn should_parse_devices_with_states() {
        let seed = Seed::from_json(
            r#"{"devices": [{
                "id": "thermostat",
                "names": ["Hallway"],
                "traits": ["TemperatureSetting"],
                "device_state": [
                    {"name": "thermostatTemperatureSetpoint", "value": 68, "unit": "F"}
                ]
            }]}"#,
        )
        .unwrap();
        let device = &seed.devices[0];
        assert!(device.supports(TraitName::TemperatureSetting));
        assert_eq!(
            device
                .state(StateName::ThermostatTemperatureSetpoint)
                .unwrap()
                .value,
            StateValue::Int(68)
        );
    }

    #[test]
    fn should_reject_duplicate_state_names() {
        let err = Seed::from_json(
            r#"{"devices": [{
                "id": "lamp",
                "device_state": [
                    {"name": "on", "value": true},
                    {"name": "on", "value": false}
                ]
            }]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { ref device, .. } if device == "lamp"));
    }

    #[test]
    fn should_reject_malformed_json() {
        assert!(matches!(
            Seed::from_json("{devices"),
            Err(SeedError::Parse(_))
        ));
    }

    #[test]
    fn should_report_missing_file() {
        let err = Seed::load(Some(Path::new("does-not-exist.json"))).unwrap_err();
        assert!(matches!(err, SeedError::Io(_)));
    }
}
