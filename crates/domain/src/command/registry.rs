//! The command registry: one [`CommandSpec`] per [`CommandName`].
//!
//! [`spec`] is an exhaustive `match`, so a command without a shape, targets
//! and effect does not compile.

use crate::command::rules;
use crate::command::{CommandName, Value, ValueShape};
use crate::device::{Device, StateName, StateValue, TraitName};
use crate::error::HomeSimError;

/// A specialized mutation rule.
pub type RuleFn = fn(&mut Device, &Value) -> Result<(), HomeSimError>;

/// What applying a command does to device state.
#[derive(Clone)]
pub enum Effect {
    /// Nothing; the command is informational or handled by the caller.
    Stateless,
    /// Assign a fixed value to every target state.
    Constant(StateValue),
    /// Assign the parsed value to the single target state.
    AssignFirst,
    /// Run a specialized rule.
    Rule(RuleFn),
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stateless => f.write_str("Stateless"),
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::AssignFirst => f.write_str("AssignFirst"),
            Self::Rule(_) => f.write_str("Rule"),
        }
    }
}

/// Registry record binding a command to its shape, targets and effect.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub command: CommandName,
    pub traits: &'static [TraitName],
    pub shape: ValueShape,
    pub targets: &'static [StateName],
    pub effect: Effect,
}

impl CommandSpec {
    #[must_use]
    pub fn is_stateless(&self) -> bool {
        matches!(self.effect, Effect::Stateless)
    }
}

const VOLUME_STEP: ValueShape = ValueShape::BoundedInteger { min: 1, max: 100 };
const VOLUME_LEVEL: ValueShape = ValueShape::BoundedInteger { min: 0, max: 100 };

/// Look up the spec of a command.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn spec(command: CommandName) -> CommandSpec {
    use CommandName as C;
    use StateName as S;
    use ValueShape as V;

    let on: &'static [StateName] = &[S::On];
    let open: &'static [StateName] = &[S::OpenPercent];
    let brightness: &'static [StateName] = &[S::Brightness];
    let fan: &'static [StateName] = &[S::FanSpeed];
    let setpoint: &'static [StateName] = &[S::ThermostatTemperatureSetpoint];
    let mode_and_setpoint: &'static [StateName] =
        &[S::ThermostatMode, S::ThermostatTemperatureSetpoint];
    let volume: &'static [StateName] = &[S::CurrentVolume];
    let modes: &'static [StateName] = &[S::CurrentModes];
    let none: &'static [StateName] = &[];

    let (shape, targets, effect): (ValueShape, &'static [StateName], Effect) = match command {
        C::On => (V::NoValue, on, Effect::Constant(StateValue::Bool(true))),
        C::Off => (V::NoValue, on, Effect::Constant(StateValue::Bool(false))),
        C::ToggleOnOff => (V::NoValue, on, Effect::Rule(rules::toggle_on_off)),

        C::Open => (V::NoValue, open, Effect::Constant(StateValue::Float(100.0))),
        C::Close => (V::NoValue, open, Effect::Constant(StateValue::Float(0.0))),
        C::OpenPercent => (V::Percentage, open, Effect::Rule(rules::open_percent)),
        C::ClosePercent => (V::Percentage, open, Effect::Rule(rules::close_percent)),
        C::OpenPercentAbsolute => (V::Percentage, open, Effect::AssignFirst),
        C::ClosePercentAbsolute => (
            V::Percentage,
            open,
            Effect::Rule(rules::close_percent_absolute),
        ),
        C::OpenAmbiguousAmount => (V::SignedDelta, open, Effect::Rule(rules::open_ambiguous)),
        C::CloseAmbiguousAmount => (V::SignedDelta, open, Effect::Rule(rules::close_ambiguous)),

        C::Start => (
            V::NoValue,
            &[S::IsStopped],
            Effect::Constant(StateValue::Bool(false)),
        ),
        C::Stop => (
            V::NoValue,
            &[S::IsStopped],
            Effect::Constant(StateValue::Bool(true)),
        ),
        C::Pause => (
            V::NoValue,
            &[S::IsPaused],
            Effect::Constant(StateValue::Bool(true)),
        ),
        C::Unpause => (
            V::NoValue,
            &[S::IsPaused],
            Effect::Constant(StateValue::Bool(false)),
        ),

        C::ActivateScene | C::DeactivateScene => (V::NoValue, none, Effect::Stateless),

        C::NextInput => (V::NoValue, &[S::CurrentInput], Effect::Rule(rules::next_input)),
        C::PreviousInput => (
            V::NoValue,
            &[S::CurrentInput],
            Effect::Rule(rules::previous_input),
        ),
        C::SetInput => (V::Text, &[S::CurrentInput], Effect::AssignFirst),
        C::OpenApp => (V::Text, &[S::CurrentApp], Effect::AssignFirst),

        C::SetBrightness => (V::UnitFloat, brightness, Effect::AssignFirst),
        C::BrighterAmbiguous => (V::Level, brightness, Effect::Rule(rules::brighter_ambiguous)),
        C::DimmerAmbiguous => (V::Level, brightness, Effect::Rule(rules::dimmer_ambiguous)),
        C::BrighterPercentage => (
            V::Percentage,
            brightness,
            Effect::Rule(rules::brighter_percentage),
        ),
        C::DimmerPercentage => (
            V::Percentage,
            brightness,
            Effect::Rule(rules::dimmer_percentage),
        ),

        C::ChangeColor => (V::Text, &[S::Color], Effect::AssignFirst),
        C::Dock => (
            V::NoValue,
            &[S::IsDocked],
            Effect::Constant(StateValue::Bool(true)),
        ),

        C::FanUpAmbiguous => (V::Level, fan, Effect::Rule(rules::fan_up_ambiguous)),
        C::FanDownAmbiguous => (V::Level, fan, Effect::Rule(rules::fan_down_ambiguous)),
        C::SetFanSpeed => (V::FanSpeed, fan, Effect::Rule(rules::set_fan_speed)),
        C::SetFanSpeedPercentage => (V::Percentage, fan, Effect::AssignFirst),
        C::FanUpPercentage => (V::Percentage, fan, Effect::Rule(rules::fan_up_percentage)),
        C::FanDownPercentage => (V::Percentage, fan, Effect::Rule(rules::fan_down_percentage)),

        C::CoolerAmbiguous => (V::Level, setpoint, Effect::Rule(rules::cooler_ambiguous)),
        C::WarmerAmbiguous => (V::Level, setpoint, Effect::Rule(rules::warmer_ambiguous)),
        C::SetTemperature => (V::FreeFloat, setpoint, Effect::Rule(rules::set_temperature)),
        C::SetTemperatureCelsius => (
            V::FreeFloat,
            setpoint,
            Effect::Rule(rules::set_temperature_celsius),
        ),
        C::SetTemperatureFahrenheit => (
            V::FreeFloat,
            setpoint,
            Effect::Rule(rules::set_temperature_fahrenheit),
        ),
        C::SetTemperatureMode => (
            V::Text,
            &[S::ThermostatMode],
            Effect::Rule(rules::set_temperature_mode),
        ),
        C::SetModeAndTemperature => (
            V::ModeTemperature,
            mode_and_setpoint,
            Effect::Rule(rules::set_mode_and_temperature),
        ),
        C::SetModeAndTemperatureFahrenheit => (
            V::ModeTemperature,
            mode_and_setpoint,
            Effect::Rule(rules::set_mode_and_temperature_fahrenheit),
        ),
        C::SetModeAndTemperatureCelsius => (
            V::ModeTemperature,
            mode_and_setpoint,
            Effect::Rule(rules::set_mode_and_temperature_celsius),
        ),
        C::ChangeRelativeTemperature => (
            V::ValueWithUnit,
            setpoint,
            Effect::Rule(rules::change_relative_temperature),
        ),

        C::ToggleSetting => (
            V::Toggle,
            &[S::ActiveToggles],
            Effect::Rule(rules::toggle_setting),
        ),
        C::FindDevice => (
            V::NoValue,
            &[S::IsRinging],
            Effect::Constant(StateValue::Bool(true)),
        ),
        C::SilenceRinging => (
            V::NoValue,
            &[S::IsRinging],
            Effect::Constant(StateValue::Bool(false)),
        ),
        C::Broadcast => (V::Text, none, Effect::Stateless),

        C::SetLightEffect => (V::LightEffect, modes, Effect::Rule(rules::set_light_effect)),
        C::SetLightEffectWithDuration => (
            V::LightEffectDuration,
            modes,
            Effect::Rule(rules::set_light_effect),
        ),

        C::VolumeUp => (VOLUME_STEP, volume, Effect::Rule(rules::volume_up)),
        C::VolumeDown => (VOLUME_STEP, volume, Effect::Rule(rules::volume_down)),
        C::VolumeUpPercentage => (
            V::Percentage,
            volume,
            Effect::Rule(rules::volume_up_percentage),
        ),
        C::VolumeDownPercentage => (
            V::Percentage,
            volume,
            Effect::Rule(rules::volume_down_percentage),
        ),
        C::VolumeUpAmbiguous => (V::Level, volume, Effect::Rule(rules::volume_up_ambiguous)),
        C::VolumeDownAmbiguous => (
            V::Level,
            volume,
            Effect::Rule(rules::volume_down_ambiguous),
        ),
        C::SetVolumeLevel => (VOLUME_LEVEL, volume, Effect::AssignFirst),
        C::SetVolumePercentage => (V::Percentage, volume, Effect::AssignFirst),
        C::Mute => (
            V::NoValue,
            &[S::IsMuted],
            Effect::Constant(StateValue::Bool(true)),
        ),
        C::Unmute => (
            V::NoValue,
            &[S::IsMuted],
            Effect::Constant(StateValue::Bool(false)),
        ),

        C::SetMode => (V::ModeSetting, modes, Effect::Rule(rules::set_mode)),
        C::Lock => (
            V::NoValue,
            &[S::IsLocked],
            Effect::Constant(StateValue::Bool(true)),
        ),
        C::Unlock => (
            V::NoValue,
            &[S::IsLocked],
            Effect::Constant(StateValue::Bool(false)),
        ),

        C::CameraStream | C::ArmDisarm => (V::NoValue, none, Effect::Stateless),
        C::HumiditySetting => (V::NoValue, &[S::HumiditySetting], Effect::Stateless),
        C::ViewSchedules | C::CancelSchedules => (V::NoValue, &[S::Schedules], Effect::Stateless),
    };

    CommandSpec {
        command,
        traits: command.traits(),
        shape,
        targets,
        effect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_assign_first_commands_exactly_one_target() {
        for &command in CommandName::ALL {
            let spec = spec(command);
            if matches!(spec.effect, Effect::AssignFirst) {
                assert_eq!(spec.targets.len(), 1, "{command}");
                assert_ne!(spec.shape, ValueShape::NoValue, "{command}");
            }
        }
    }

    #[test]
    fn should_give_constant_commands_no_value_shape_and_targets() {
        for &command in CommandName::ALL {
            let spec = spec(command);
            if matches!(spec.effect, Effect::Constant(_)) {
                assert_eq!(spec.shape, ValueShape::NoValue, "{command}");
                assert!(!spec.targets.is_empty(), "{command}");
            }
        }
    }

    #[test]
    fn should_mark_informational_commands_stateless() {
        for command in [
            CommandName::ActivateScene,
            CommandName::DeactivateScene,
            CommandName::Broadcast,
            CommandName::CameraStream,
            CommandName::HumiditySetting,
            CommandName::ArmDisarm,
            CommandName::ViewSchedules,
            CommandName::CancelSchedules,
        ] {
            assert!(spec(command).is_stateless(), "{command}");
        }
        assert!(!spec(CommandName::On).is_stateless());
    }

    #[test]
    fn should_carry_command_traits() {
        let spec = spec(CommandName::SetTemperatureCelsius);
        assert_eq!(spec.traits, &[TraitName::TemperatureSetting]);
        assert_eq!(spec.targets, &[StateName::ThermostatTemperatureSetpoint]);
    }
}
