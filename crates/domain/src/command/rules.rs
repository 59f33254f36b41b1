//! Specialized mutation rules.
//!
//! Each rule reads and writes only the device it is given. Rules run on a
//! staged copy, so returning an error part-way leaves the caller's device
//! untouched.

use crate::command::Value;
use crate::device::{Device, ModeValue, StateName, StateValue};
use crate::error::{HomeSimError, ValueShapeError};
use crate::unit::{convert_delta_between, convert_value_between, round2, TemperatureUnit};

/// Ordered inputs cycled by `next_input` / `previous_input`.
pub const INPUTS: &[&str] = &["hdmi_1", "hdmi_2", "hdmi_3", "hdmi_4", "usb", "tv", "aux"];

/// Mode-table key reserved for light effects.
pub const LIGHT_EFFECT_MODE: &str = "lightEffect";

const THERMOSTAT_MODE: &str = "thermostatMode";

const OPEN_STEP: f64 = 15.0;
const BRIGHTNESS_STEP: f64 = 0.08;
const FAN_STEP: f64 = 10.0;
const VOLUME_STEP: f64 = 5.0;

fn adjust_float(
    device: &mut Device,
    name: StateName,
    delta: f64,
    lo: f64,
    hi: f64,
) -> Result<(), HomeSimError> {
    let entry = device.state_or_insert(name);
    let current = entry.as_f64()?;
    entry.value = StateValue::Float((current + delta).clamp(lo, hi));
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn adjust_int(
    device: &mut Device,
    name: StateName,
    delta: f64,
    lo: f64,
    hi: f64,
) -> Result<(), HomeSimError> {
    let entry = device.state_or_insert(name);
    let current = entry.as_f64()?;
    entry.value = StateValue::Int((current + delta).clamp(lo, hi).round() as i64);
    Ok(())
}

pub(crate) fn toggle_on_off(device: &mut Device, _: &Value) -> Result<(), HomeSimError> {
    let entry = device.state_or_insert(StateName::On);
    let current = entry.as_bool()?;
    entry.value = StateValue::Bool(!current);
    Ok(())
}

pub(crate) fn open_percent(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::OpenPercent, value.number()?, 0.0, 100.0)
}

pub(crate) fn close_percent(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::OpenPercent, -value.number()?, 0.0, 100.0)
}

pub(crate) fn close_percent_absolute(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    let open = 100.0 - value.number()?;
    device.set_state(StateName::OpenPercent, StateValue::Float(open));
    Ok(())
}

pub(crate) fn open_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::OpenPercent, value.number()? * OPEN_STEP, 0.0, 100.0)
}

pub(crate) fn close_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::OpenPercent, -value.number()? * OPEN_STEP, 0.0, 100.0)
}

fn cycle_input(device: &mut Device, forward: bool) -> Result<(), HomeSimError> {
    let entry = device.state_or_insert(StateName::CurrentInput);
    let current = entry.as_text()?;
    let index = INPUTS.iter().position(|i| *i == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % INPUTS.len()
    } else {
        (index + INPUTS.len() - 1) % INPUTS.len()
    };
    entry.value = StateValue::Text(INPUTS[next].to_string());
    Ok(())
}

pub(crate) fn next_input(device: &mut Device, _: &Value) -> Result<(), HomeSimError> {
    cycle_input(device, true)
}

pub(crate) fn previous_input(device: &mut Device, _: &Value) -> Result<(), HomeSimError> {
    cycle_input(device, false)
}

pub(crate) fn brighter_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::Brightness, value.number()? * BRIGHTNESS_STEP, 0.0, 1.0)
}

pub(crate) fn dimmer_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::Brightness, -value.number()? * BRIGHTNESS_STEP, 0.0, 1.0)
}

pub(crate) fn brighter_percentage(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::Brightness, value.number()? / 100.0, 0.0, 1.0)
}

pub(crate) fn dimmer_percentage(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_float(device, StateName::Brightness, -value.number()? / 100.0, 0.0, 1.0)
}

pub(crate) fn fan_up_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::FanSpeed, value.number()? * FAN_STEP, 0.0, 100.0)
}

pub(crate) fn fan_down_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::FanSpeed, -value.number()? * FAN_STEP, 0.0, 100.0)
}

pub(crate) fn fan_up_percentage(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::FanSpeed, value.number()?, 0.0, 100.0)
}

pub(crate) fn fan_down_percentage(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::FanSpeed, -value.number()?, 0.0, 100.0)
}

pub(crate) fn set_fan_speed(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    let Value::FanSpeed(speed) = value else {
        return Err(ValueShapeError::WrongShape { expected: "fan speed" }.into());
    };
    device.set_state(StateName::FanSpeed, StateValue::Int(speed.percent()));
    Ok(())
}

/// Unit the setpoint is stored in; Fahrenheit when unset or unrecognized.
fn setpoint_unit(device: &Device) -> TemperatureUnit {
    device
        .state(StateName::ThermostatTemperatureSetpoint)
        .and_then(|s| s.unit.as_deref())
        .and_then(TemperatureUnit::from_token)
        .unwrap_or(TemperatureUnit::Fahrenheit)
}

fn write_setpoint(
    device: &mut Device,
    value: f64,
    from: Option<TemperatureUnit>,
) -> Result<(), HomeSimError> {
    let stored = setpoint_unit(device);
    let value = from.map_or(value, |unit| convert_value_between(value, unit, stored));
    let entry = device.state_or_insert(StateName::ThermostatTemperatureSetpoint);
    entry.as_f64()?;
    entry.value = StateValue::Float(round2(value));
    Ok(())
}

fn shift_setpoint(device: &mut Device, delta: f64) -> Result<(), HomeSimError> {
    let entry = device.state_or_insert(StateName::ThermostatTemperatureSetpoint);
    let current = entry.as_f64()?;
    entry.value = StateValue::Float(round2(current + delta));
    Ok(())
}

fn write_thermostat_mode(device: &mut Device, mode: &str) -> Result<(), HomeSimError> {
    if let Some(allowed) = device.toggle_mode(THERMOSTAT_MODE)
        && !allowed.settings.is_empty()
    {
        let ids = allowed.setting_ids();
        if !ids.contains(&mode) {
            return Err(ValueShapeError::not_allowed("thermostat mode", mode, &ids).into());
        }
    }
    let entry = device.state_or_insert(StateName::ThermostatMode);
    entry.as_text()?;
    entry.value = StateValue::Text(mode.to_string());
    Ok(())
}

pub(crate) fn cooler_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    shift_setpoint(device, -value.number()?)
}

pub(crate) fn warmer_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    shift_setpoint(device, value.number()?)
}

pub(crate) fn set_temperature(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    write_setpoint(device, value.number()?, None)
}

pub(crate) fn set_temperature_celsius(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    write_setpoint(device, value.number()?, Some(TemperatureUnit::Celsius))
}

pub(crate) fn set_temperature_fahrenheit(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    write_setpoint(device, value.number()?, Some(TemperatureUnit::Fahrenheit))
}

pub(crate) fn set_temperature_mode(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    write_thermostat_mode(device, value.text()?)
}

fn mode_and_temperature(
    device: &mut Device,
    value: &Value,
    from: Option<TemperatureUnit>,
) -> Result<(), HomeSimError> {
    let Value::ModeTemperature { mode, temperature } = value else {
        return Err(ValueShapeError::WrongShape {
            expected: "mode and temperature",
        }
        .into());
    };
    write_thermostat_mode(device, mode)?;
    write_setpoint(device, *temperature, from)
}

pub(crate) fn set_mode_and_temperature(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    mode_and_temperature(device, value, None)
}

pub(crate) fn set_mode_and_temperature_fahrenheit(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    mode_and_temperature(device, value, Some(TemperatureUnit::Fahrenheit))
}

pub(crate) fn set_mode_and_temperature_celsius(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    mode_and_temperature(device, value, Some(TemperatureUnit::Celsius))
}

pub(crate) fn change_relative_temperature(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    let Value::WithUnit { value, unit } = *value else {
        return Err(ValueShapeError::WrongShape {
            expected: "value with unit",
        }
        .into());
    };
    let delta = convert_delta_between(value, unit, setpoint_unit(device));
    shift_setpoint(device, delta)
}

pub(crate) fn toggle_setting(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    let Value::Toggle { id, enabled } = value else {
        return Err(ValueShapeError::WrongShape { expected: "toggle" }.into());
    };
    if !device.toggles_modes.is_empty() && device.toggle_mode(id).is_none() {
        let ids = device.toggle_mode_ids();
        return Err(ValueShapeError::not_allowed("toggle", id, &ids).into());
    }
    device
        .state_or_insert(StateName::ActiveToggles)
        .modes_mut()?
        .insert(id.clone(), ModeValue::Flag(*enabled));
    Ok(())
}

pub(crate) fn set_light_effect(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    let effect = match value {
        Value::LightEffect(effect) | Value::LightEffectDuration { effect, .. } => *effect,
        _ => {
            return Err(ValueShapeError::WrongShape {
                expected: "light effect",
            }
            .into());
        }
    };
    device
        .state_or_insert(StateName::CurrentModes)
        .modes_mut()?
        .insert(
            LIGHT_EFFECT_MODE.to_string(),
            ModeValue::Text(effect.as_str().to_string()),
        );
    Ok(())
}

pub(crate) fn volume_up(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::CurrentVolume, value.number()?, 0.0, 100.0)
}

pub(crate) fn volume_down(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::CurrentVolume, -value.number()?, 0.0, 100.0)
}

pub(crate) fn volume_up_percentage(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    volume_up(device, value)
}

pub(crate) fn volume_down_percentage(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    volume_down(device, value)
}

pub(crate) fn volume_up_ambiguous(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::CurrentVolume, value.number()? * VOLUME_STEP, 0.0, 100.0)
}

pub(crate) fn volume_down_ambiguous(
    device: &mut Device,
    value: &Value,
) -> Result<(), HomeSimError> {
    adjust_int(device, StateName::CurrentVolume, -value.number()? * VOLUME_STEP, 0.0, 100.0)
}

/// Write a mode-table entry; an empty value removes the key.
///
/// The mode id and value are checked against `toggles_modes` when the
/// device declares any. The light-effect key is never checked.
pub(crate) fn set_mode(device: &mut Device, value: &Value) -> Result<(), HomeSimError> {
    let Value::ModeSetting { mode_id, value } = value else {
        return Err(ValueShapeError::WrongShape {
            expected: "mode setting",
        }
        .into());
    };
    if mode_id != LIGHT_EFFECT_MODE && !device.toggles_modes.is_empty() {
        let Some(mode) = device.toggle_mode(mode_id) else {
            let ids = device.toggle_mode_ids();
            return Err(ValueShapeError::not_allowed("mode", mode_id, &ids).into());
        };
        let settings = mode.setting_ids();
        if !value.is_empty() && !settings.is_empty() && !settings.contains(&value.as_str()) {
            return Err(ValueShapeError::not_allowed("mode value", value, &settings).into());
        }
    }
    let modes = device.state_or_insert(StateName::CurrentModes).modes_mut()?;
    if value.is_empty() {
        modes.remove(mode_id);
    } else {
        modes.insert(mode_id.clone(), ModeValue::Text(value.clone()));
    }
    Ok(())
}
