//! The dispatcher: look up, validate, then mutate a staged copy and commit.

use crate::command::registry::{spec, Effect};
use crate::command::{CommandName, Value};
use crate::device::{Device, StateKind, StateName, StateValue};
use crate::error::{HomeSimError, StateError, ValueShapeError};

/// Apply the command named `command` to `device`.
///
/// # Errors
///
/// - [`HomeSimError::UnsupportedCommand`] for an unknown identifier
/// - [`HomeSimError::Value`] when `raw` does not satisfy the value shape
/// - [`HomeSimError::State`] when a state holds the wrong kind of value
///
/// On error the device is left exactly as it was.
pub fn dispatch<S: AsRef<str>>(
    device: &mut Device,
    command: &str,
    raw: &[S],
) -> Result<(), HomeSimError> {
    apply(device, command.parse()?, raw)
}

/// Typed counterpart of [`dispatch`].
///
/// # Errors
///
/// See [`dispatch`].
pub fn apply<S: AsRef<str>>(
    device: &mut Device,
    command: CommandName,
    raw: &[S],
) -> Result<(), HomeSimError> {
    let spec = spec(command);
    let value = spec.shape.parse(command, raw)?;

    if spec.is_stateless() {
        return Ok(());
    }

    let mut staged = device.clone();
    match &spec.effect {
        Effect::Stateless => {}
        Effect::Constant(constant) => {
            for &target in spec.targets {
                staged.set_state(target, constant.clone());
            }
        }
        Effect::AssignFirst => {
            for &target in spec.targets {
                assign(&mut staged, target, &value)?;
            }
        }
        Effect::Rule(rule) => rule(&mut staged, &value)?,
    }
    *device = staged;
    Ok(())
}

/// Coerce the parsed value to the target state's kind and store it.
#[allow(clippy::cast_possible_truncation)]
fn assign(device: &mut Device, target: StateName, value: &Value) -> Result<(), HomeSimError> {
    let coerced = match (target.kind(), value) {
        (StateKind::Int, Value::Integer(i)) => StateValue::Int(*i),
        (StateKind::Int, Value::Number(n)) => StateValue::Int(n.round() as i64),
        (StateKind::Float, Value::Integer(_) | Value::Number(_)) => {
            StateValue::Float(value.number()?)
        }
        (StateKind::Text, Value::Text(s)) => StateValue::Text(s.clone()),
        _ => {
            return Err(ValueShapeError::WrongShape {
                expected: "assignable",
            }
            .into());
        }
    };
    let entry = device.state_or_insert(target);
    let compatible = matches!(
        (&entry.value, &coerced),
        (
            StateValue::Int(_) | StateValue::Float(_),
            StateValue::Int(_) | StateValue::Float(_)
        ) | (StateValue::Text(_), StateValue::Text(_))
    );
    if !compatible {
        return Err(StateError {
            state: target.to_string(),
            expected: kind_label(target.kind()),
        }
        .into());
    }
    entry.value = coerced;
    Ok(())
}

fn kind_label(kind: StateKind) -> &'static str {
    match kind {
        StateKind::Bool => "boolean",
        StateKind::Int | StateKind::Float => "numeric",
        StateKind::Text => "text",
        StateKind::Map => "mapping",
        StateKind::List => "list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{StateEntry, TraitName};

    const NONE: &[&str] = &[];

    fn thermostat() -> Device {
        Device::builder()
            .id("thermo-1")
            .with_trait(TraitName::TemperatureSetting)
            .state(
                StateEntry::new(StateName::ThermostatTemperatureSetpoint, StateValue::Float(70.0))
                    .with_unit("F"),
            )
            .build()
            .unwrap()
    }

    fn fan() -> Device {
        Device::builder()
            .id("fan-1")
            .state(StateEntry::new(StateName::FanSpeed, StateValue::Int(33)))
            .build()
            .unwrap()
    }

    #[test]
    fn should_convert_celsius_setpoint_into_stored_fahrenheit() {
        let mut device = thermostat();
        dispatch(&mut device, "set_temperature_celsius", &["21"]).unwrap();
        let setpoint = device.state(StateName::ThermostatTemperatureSetpoint).unwrap();
        assert_eq!(setpoint.value, StateValue::Float(69.8));
        assert_eq!(setpoint.unit.as_deref(), Some("F"));
    }

    #[test]
    fn should_reject_unknown_fan_speed_without_mutation() {
        let mut device = fan();
        let before = device.clone();
        let err = dispatch(&mut device, "set_fan_speed", &["extreme"]).unwrap_err();
        assert!(matches!(err, HomeSimError::Value(ValueShapeError::NotAllowed { .. })));
        assert!(err.to_string().contains("low, medium, high"));
        assert_eq!(device, before);
    }

    #[test]
    fn should_reject_unsupported_command() {
        let mut device = fan();
        let err = dispatch(&mut device, "launch", NONE).unwrap_err();
        assert!(matches!(err, HomeSimError::UnsupportedCommand(_)));
    }

    #[test]
    fn should_reject_values_on_no_value_commands_without_mutation() {
        for &command in CommandName::ALL {
            if spec(command).shape != crate::command::ValueShape::NoValue {
                continue;
            }
            let mut device = fan();
            let before = device.clone();
            let err = apply(&mut device, command, &[""]).unwrap_err();
            assert!(
                matches!(err, HomeSimError::Value(ValueShapeError::ValuesNotAccepted { .. })),
                "{command}"
            );
            assert_eq!(device, before, "{command}");
        }
    }

    #[test]
    fn should_reject_zero_for_every_signed_delta_command() {
        for &command in CommandName::ALL {
            if spec(command).shape != crate::command::ValueShape::SignedDelta {
                continue;
            }
            let mut device = fan();
            let err = apply(&mut device, command, &["0"]).unwrap_err();
            assert!(matches!(err, HomeSimError::Value(ValueShapeError::ZeroAmount)));
        }
    }

    #[test]
    fn should_keep_percentage_states_within_bounds_for_large_deltas() {
        let cases = [
            ("open_percent", StateName::OpenPercent),
            ("close_percent", StateName::OpenPercent),
            ("fan_up_percentage", StateName::FanSpeed),
            ("fan_down_percentage", StateName::FanSpeed),
            ("volume_up_percentage", StateName::CurrentVolume),
            ("volume_down_percentage", StateName::CurrentVolume),
        ];
        for (command, state) in cases {
            let mut device = Device::builder().id("d").build().unwrap();
            for _ in 0..3 {
                dispatch(&mut device, command, &["100"]).unwrap();
                let value = device.state(state).unwrap().as_f64().unwrap();
                assert!((0.0..=100.0).contains(&value), "{command}: {value}");
            }
        }
    }

    #[test]
    fn should_assign_constant_to_target() {
        let mut device = fan();
        dispatch(&mut device, "on", NONE).unwrap();
        dispatch(&mut device, "lock", NONE).unwrap();
        assert_eq!(device.state(StateName::On).unwrap().value, StateValue::Bool(true));
        assert_eq!(device.state(StateName::IsLocked).unwrap().value, StateValue::Bool(true));
    }

    #[test]
    fn should_round_percentage_into_integer_state() {
        let mut device = fan();
        dispatch(&mut device, "set_fan_speed_percentage", &["42.6"]).unwrap();
        assert_eq!(device.state(StateName::FanSpeed).unwrap().value, StateValue::Int(43));
    }

    #[test]
    fn should_widen_integer_state_when_assigning_float() {
        let mut device = Device::builder()
            .id("blind")
            .state(StateEntry::new(StateName::OpenPercent, StateValue::Int(10)))
            .build()
            .unwrap();
        dispatch(&mut device, "open_percent_absolute", &["55.5"]).unwrap();
        assert_eq!(
            device.state(StateName::OpenPercent).unwrap().value,
            StateValue::Float(55.5)
        );
    }

    #[test]
    fn should_leave_state_untouched_for_stateless_commands() {
        let mut device = fan();
        let before = device.clone();
        dispatch(&mut device, "broadcast", &["dinner is ready"]).unwrap();
        dispatch(&mut device, "view_schedules", NONE).unwrap();
        assert_eq!(device, before);
    }

    #[test]
    fn should_not_commit_partial_mode_and_temperature_change() {
        let mut device = thermostat();
        device.set_state(StateName::ThermostatTemperatureSetpoint, StateValue::Text("hot".into()));
        let before = device.clone();
        let err = dispatch(&mut device, "set_mode_and_temperature", &["heat", "72"]).unwrap_err();
        assert!(matches!(err, HomeSimError::State(_)));
        assert_eq!(device, before);
    }

    #[test]
    fn should_reject_assignment_into_mistyped_state() {
        let mut device = Device::builder()
            .id("lamp")
            .state(StateEntry::new(StateName::Brightness, StateValue::Text("dim".into())))
            .build()
            .unwrap();
        let err = dispatch(&mut device, "set_brightness", &["0.4"]).unwrap_err();
        assert!(matches!(err, HomeSimError::State(_)));
    }
}
