//! Trait names — capability groupings of commands.

use serde::{Deserialize, Serialize};

/// A named capability a device can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitName {
    OnOff,
    OpenClose,
    StartStop,
    TransportControl,
    Scene,
    InputSelector,
    AppSelector,
    Brightness,
    ColorSetting,
    Dock,
    FanSpeed,
    TemperatureSetting,
    Toggles,
    Locator,
    Broadcast,
    LightEffects,
    Volume,
    Modes,
    LockUnlock,
    CameraStream,
    HumiditySetting,
    ArmDisarm,
    ViewSchedules,
    CancelSchedules,
}

impl TraitName {
    /// Wire name, e.g. `TemperatureSetting`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnOff => "OnOff",
            Self::OpenClose => "OpenClose",
            Self::StartStop => "StartStop",
            Self::TransportControl => "TransportControl",
            Self::Scene => "Scene",
            Self::InputSelector => "InputSelector",
            Self::AppSelector => "AppSelector",
            Self::Brightness => "Brightness",
            Self::ColorSetting => "ColorSetting",
            Self::Dock => "Dock",
            Self::FanSpeed => "FanSpeed",
            Self::TemperatureSetting => "TemperatureSetting",
            Self::Toggles => "Toggles",
            Self::Locator => "Locator",
            Self::Broadcast => "Broadcast",
            Self::LightEffects => "LightEffects",
            Self::Volume => "Volume",
            Self::Modes => "Modes",
            Self::LockUnlock => "LockUnlock",
            Self::CameraStream => "CameraStream",
            Self::HumiditySetting => "HumiditySetting",
            Self::ArmDisarm => "ArmDisarm",
            Self::ViewSchedules => "ViewSchedules",
            Self::CancelSchedules => "CancelSchedules",
        }
    }
}

impl std::fmt::Display for TraitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
