//! Command identifiers and the traits that own them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::TraitName;
use crate::error::HomeSimError;

macro_rules! commands {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Every command the engine knows.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum CommandName {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl CommandName {
            /// All commands, in catalogue order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Wire identifier, e.g. `set_temperature_celsius`.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for CommandName {
            type Err = HomeSimError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(HomeSimError::UnsupportedCommand(other.to_string())),
                }
            }
        }
    };
}

commands! {
    On => "on",
    Off => "off",
    ToggleOnOff => "toggle_on_off",
    Open => "open",
    Close => "close",
    OpenPercent => "open_percent",
    ClosePercent => "close_percent",
    OpenPercentAbsolute => "open_percent_absolute",
    ClosePercentAbsolute => "close_percent_absolute",
    OpenAmbiguousAmount => "open_ambiguous_amount",
    CloseAmbiguousAmount => "close_ambiguous_amount",
    Start => "start",
    Stop => "stop",
    Pause => "pause",
    Unpause => "unpause",
    ActivateScene => "activate_scene",
    DeactivateScene => "deactivate_scene",
    NextInput => "next_input",
    PreviousInput => "previous_input",
    SetInput => "set_input",
    OpenApp => "open_app",
    SetBrightness => "set_brightness",
    BrighterAmbiguous => "brighter_ambiguous",
    DimmerAmbiguous => "dimmer_ambiguous",
    BrighterPercentage => "brighter_percentage",
    DimmerPercentage => "dimmer_percentage",
    ChangeColor => "change_color",
    Dock => "dock",
    FanUpAmbiguous => "fan_up_ambiguous",
    FanDownAmbiguous => "fan_down_ambiguous",
    SetFanSpeed => "set_fan_speed",
    SetFanSpeedPercentage => "set_fan_speed_percentage",
    FanUpPercentage => "fan_up_percentage",
    FanDownPercentage => "fan_down_percentage",
    CoolerAmbiguous => "cooler_ambiguous",
    WarmerAmbiguous => "warmer_ambiguous",
    SetTemperature => "set_temperature",
    SetTemperatureCelsius => "set_temperature_celsius",
    SetTemperatureFahrenheit => "set_temperature_fahrenheit",
    SetTemperatureMode => "set_temperature_mode",
    SetModeAndTemperature => "set_mode_and_temperature",
    SetModeAndTemperatureFahrenheit => "set_mode_and_temperature_fahrenheit",
    SetModeAndTemperatureCelsius => "set_mode_and_temperature_celsius",
    ChangeRelativeTemperature => "change_relative_temperature",
    ToggleSetting => "toggle_setting",
    FindDevice => "find_device",
    SilenceRinging => "silence_ringing",
    Broadcast => "broadcast",
    SetLightEffect => "set_light_effect",
    SetLightEffectWithDuration => "set_light_effect_with_duration",
    VolumeUp => "volume_up",
    VolumeDown => "volume_down",
    VolumeUpPercentage => "volume_up_percentage",
    VolumeDownPercentage => "volume_down_percentage",
    VolumeUpAmbiguous => "volume_up_ambiguous",
    VolumeDownAmbiguous => "volume_down_ambiguous",
    SetVolumeLevel => "set_volume_level",
    SetVolumePercentage => "set_volume_percentage",
    Mute => "mute",
    Unmute => "unmute",
    SetMode => "set_mode",
    Lock => "lock",
    Unlock => "unlock",
    CameraStream => "camera_stream",
    HumiditySetting => "humidity_setting",
    ArmDisarm => "arm_disarm",
    ViewSchedules => "view_schedules",
    CancelSchedules => "cancel_schedules",
}

impl CommandName {
    /// Traits under which a device may accept this command.
    ///
    /// Start/stop style commands belong to both `StartStop` and
    /// `TransportControl`; every other command has exactly one owner.
    #[must_use]
    pub fn traits(self) -> &'static [TraitName] {
        match self {
            Self::On | Self::Off | Self::ToggleOnOff => &[TraitName::OnOff],
            Self::Open
            | Self::Close
            | Self::OpenPercent
            | Self::ClosePercent
            | Self::OpenPercentAbsolute
            | Self::ClosePercentAbsolute
            | Self::OpenAmbiguousAmount
            | Self::CloseAmbiguousAmount => &[TraitName::OpenClose],
            Self::Start | Self::Stop | Self::Pause | Self::Unpause => {
                &[TraitName::StartStop, TraitName::TransportControl]
            }
            Self::ActivateScene | Self::DeactivateScene => &[TraitName::Scene],
            Self::NextInput | Self::PreviousInput | Self::SetInput => &[TraitName::InputSelector],
            Self::OpenApp => &[TraitName::AppSelector],
            Self::SetBrightness
            | Self::BrighterAmbiguous
            | Self::DimmerAmbiguous
            | Self::BrighterPercentage
            | Self::DimmerPercentage => &[TraitName::Brightness],
            Self::ChangeColor => &[TraitName::ColorSetting],
            Self::Dock => &[TraitName::Dock],
            Self::FanUpAmbiguous
            | Self::FanDownAmbiguous
            | Self::SetFanSpeed
            | Self::SetFanSpeedPercentage
            | Self::FanUpPercentage
            | Self::FanDownPercentage => &[TraitName::FanSpeed],
            Self::CoolerAmbiguous
            | Self::WarmerAmbiguous
            | Self::SetTemperature
            | Self::SetTemperatureCelsius
            | Self::SetTemperatureFahrenheit
            | Self::SetTemperatureMode
            | Self::SetModeAndTemperature
            | Self::SetModeAndTemperatureFahrenheit
            | Self::SetModeAndTemperatureCelsius
            | Self::ChangeRelativeTemperature => &[TraitName::TemperatureSetting],
            Self::ToggleSetting => &[TraitName::Toggles],
            Self::FindDevice | Self::SilenceRinging => &[TraitName::Locator],
            Self::Broadcast => &[TraitName::Broadcast],
            Self::SetLightEffect | Self::SetLightEffectWithDuration => &[TraitName::LightEffects],
            Self::VolumeUp
            | Self::VolumeDown
            | Self::VolumeUpPercentage
            | Self::VolumeDownPercentage
            | Self::VolumeUpAmbiguous
            | Self::VolumeDownAmbiguous
            | Self::SetVolumeLevel
            | Self::SetVolumePercentage
            | Self::Mute
            | Self::Unmute => &[TraitName::Volume],
            Self::SetMode => &[TraitName::Modes],
            Self::Lock | Self::Unlock => &[TraitName::LockUnlock],
            Self::CameraStream => &[TraitName::CameraStream],
            Self::HumiditySetting => &[TraitName::HumiditySetting],
            Self::ArmDisarm => &[TraitName::ArmDisarm],
            Self::ViewSchedules => &[TraitName::ViewSchedules],
            Self::CancelSchedules => &[TraitName::CancelSchedules],
        }
    }

    /// The trait reported for this command in errors and events.
    #[must_use]
    pub fn primary_trait(self) -> TraitName {
        self.traits()[0]
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
