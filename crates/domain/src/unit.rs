//! Temperature unit conversion.
//!
//! Unit tokens are normalized by their first letter, case-insensitively:
//! anything starting with `c` is Celsius, anything starting with `f` is
//! Fahrenheit. Other tokens pass through untouched and convert as identity.

use serde::{Deserialize, Serialize};

/// One of the two temperature scales the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Classify a token by its first letter.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => Some(Self::Celsius),
            Some('F') => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    /// Single-letter symbol, `C` or `F`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Normalize a unit token to `C`/`F`, or return it unchanged.
#[must_use]
pub fn normalize_unit(token: &str) -> String {
    TemperatureUnit::from_token(token).map_or_else(|| token.to_string(), |u| u.symbol().to_string())
}

/// Convert an absolute temperature between unit tokens.
#[must_use]
pub fn convert_value(value: f64, from: &str, to: &str) -> f64 {
    match (TemperatureUnit::from_token(from), TemperatureUnit::from_token(to)) {
        (Some(from), Some(to)) => convert_value_between(value, from, to),
        _ => value,
    }
}

/// Convert a temperature difference between unit tokens (no ±32 offset).
#[must_use]
pub fn convert_delta(delta: f64, from: &str, to: &str) -> f64 {
    match (TemperatureUnit::from_token(from), TemperatureUnit::from_token(to)) {
        (Some(from), Some(to)) => convert_delta_between(delta, from, to),
        _ => delta,
    }
}

/// Typed counterpart of [`convert_value`].
#[must_use]
pub fn convert_value_between(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => (value - 32.0) * 5.0 / 9.0,
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
        _ => value,
    }
}

/// Typed counterpart of [`convert_delta`].
#[must_use]
pub fn convert_delta_between(delta: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => delta * 5.0 / 9.0,
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => delta * 9.0 / 5.0,
        _ => delta,
    }
}

/// Round to two decimal places, the precision stored setpoints use.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
