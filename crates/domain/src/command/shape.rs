//! Value shapes — how raw string arguments become a typed [`Value`].

use crate::command::CommandName;
use crate::error::ValueShapeError;
use crate::unit::TemperatureUnit;

/// Unit tokens accepted by value-with-unit arguments, compared case-insensitively.
pub const TEMPERATURE_UNIT_TOKENS: &[&str] = &["C", "F", "CELSIUS", "FAHRENHEIT"];

const TOGGLE_TOKENS: &[&str] = &["true", "false"];

/// Fan speed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub const TOKENS: &'static [&'static str] = &["low", "medium", "high"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Fan speed percentage stored for this preset.
    #[must_use]
    pub fn percent(self) -> i64 {
        match self {
            Self::Low => 33,
            Self::Medium => 66,
            Self::High => 100,
        }
    }
}

/// Light effects a lamp can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightEffect {
    Sleep,
    Wake,
    ColorLoop,
    Pulse,
}

impl LightEffect {
    pub const TOKENS: &'static [&'static str] = &["sleep", "wake", "colorLoop", "pulse"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "sleep" => Some(Self::Sleep),
            "wake" => Some(Self::Wake),
            "colorLoop" => Some(Self::ColorLoop),
            "pulse" => Some(Self::Pulse),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Wake => "wake",
            Self::ColorLoop => "colorLoop",
            Self::Pulse => "pulse",
        }
    }
}

/// The argument contract of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// No arguments at all, not even an empty string.
    NoValue,
    /// A number in `0..=100`.
    Percentage,
    /// A number in `0.0..=1.0`.
    UnitFloat,
    /// An integer in `1..=5`.
    Level,
    /// A non-zero integer in `-3..=3`.
    SignedDelta,
    /// Any finite number.
    FreeFloat,
    /// A number followed by a temperature unit token.
    ValueWithUnit,
    /// A non-empty mode followed by a number.
    ModeTemperature,
    /// A non-empty mode id followed by a value; an empty value means clear.
    ModeSetting,
    /// A non-empty toggle id followed by `true` or `false`.
    Toggle,
    FanSpeed,
    LightEffect,
    /// A light effect followed by a positive number of seconds.
    LightEffectDuration,
    /// An integer in `min..=max`.
    BoundedInteger { min: i64, max: i64 },
    /// A single non-empty string.
    Text,
}

/// A validated, typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Number(f64),
    Integer(i64),
    WithUnit {
        value: f64,
        unit: TemperatureUnit,
    },
    ModeTemperature {
        mode: String,
        temperature: f64,
    },
    ModeSetting {
        mode_id: String,
        value: String,
    },
    Toggle {
        id: String,
        enabled: bool,
    },
    FanSpeed(FanSpeed),
    LightEffect(LightEffect),
    LightEffectDuration {
        effect: LightEffect,
        seconds: u64,
    },
    Text(String),
}

impl Value {
    /// Numeric payload; integers widen.
    ///
    /// # Errors
    ///
    /// Returns [`ValueShapeError::WrongShape`] for non-numeric values.
    #[allow(clippy::cast_precision_loss)]
    pub fn number(&self) -> Result<f64, ValueShapeError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Integer(i) => Ok(*i as f64),
            _ => Err(ValueShapeError::WrongShape { expected: "numeric" }),
        }
    }

    /// Text payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValueShapeError::WrongShape`] for non-text values.
    pub fn text(&self) -> Result<&str, ValueShapeError> {
        match self {
            Self::Text(s) => Ok(s),
            _ => Err(ValueShapeError::WrongShape { expected: "text" }),
        }
    }
}

impl ValueShape {
    /// Number of raw arguments the shape consumes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::NoValue => 0,
            Self::ValueWithUnit
            | Self::ModeTemperature
            | Self::ModeSetting
            | Self::Toggle
            | Self::LightEffectDuration => 2,
            _ => 1,
        }
    }

    /// Arguments worth passing for this shape: none for [`ValueShape::NoValue`].
    #[must_use]
    pub fn effective_values<S>(self, values: &[S]) -> &[S] {
        if self == Self::NoValue { &[] } else { values }
    }

    /// Validate raw arguments for `command` and build the typed value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueShapeError`] naming the offending argument when the
    /// count, type, range or token set does not match.
    pub fn parse<S: AsRef<str>>(
        self,
        command: CommandName,
        raw: &[S],
    ) -> Result<Value, ValueShapeError> {
        if self == Self::NoValue {
            if !raw.is_empty() {
                return Err(ValueShapeError::ValuesNotAccepted {
                    command: command.to_string(),
                });
            }
            return Ok(Value::None);
        }
        if raw.is_empty() {
            return Err(ValueShapeError::ValuesRequired {
                command: command.to_string(),
            });
        }
        if raw.len() != self.arity() {
            return Err(ValueShapeError::Arity {
                expected: self.arity(),
                actual: raw.len(),
            });
        }
        let first = raw[0].as_ref();
        let second = raw.get(1).map_or("", AsRef::as_ref);

        match self {
            Self::NoValue => Ok(Value::None),
            Self::Percentage => Ok(Value::Number(ranged_number(first, 0.0, 100.0)?)),
            Self::UnitFloat => Ok(Value::Number(ranged_number(first, 0.0, 1.0)?)),
            Self::Level => Ok(Value::Integer(ranged_integer(first, 1, 5)?)),
            Self::SignedDelta => {
                let delta = ranged_integer(first, -3, 3)?;
                if delta == 0 {
                    return Err(ValueShapeError::ZeroAmount);
                }
                Ok(Value::Integer(delta))
            }
            Self::FreeFloat => Ok(Value::Number(number(first)?)),
            Self::ValueWithUnit => {
                let value = number(first)?;
                let token = second.trim().to_ascii_uppercase();
                let unit = TEMPERATURE_UNIT_TOKENS
                    .contains(&token.as_str())
                    .then(|| TemperatureUnit::from_token(&token))
                    .flatten()
                    .ok_or_else(|| {
                        ValueShapeError::not_allowed("unit", second, TEMPERATURE_UNIT_TOKENS)
                    })?;
                Ok(Value::WithUnit { value, unit })
            }
            Self::ModeTemperature => Ok(Value::ModeTemperature {
                mode: non_empty(first, "mode")?,
                temperature: number(second)?,
            }),
            Self::ModeSetting => Ok(Value::ModeSetting {
                mode_id: non_empty(first, "mode id")?,
                value: second.to_string(),
            }),
            Self::Toggle => {
                let id = non_empty(first, "toggle id")?;
                let enabled = match second.trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(ValueShapeError::not_allowed(
                            "toggle value",
                            second,
                            TOGGLE_TOKENS,
                        ));
                    }
                };
                Ok(Value::Toggle { id, enabled })
            }
            Self::FanSpeed => FanSpeed::from_token(first)
                .map(Value::FanSpeed)
                .ok_or_else(|| ValueShapeError::not_allowed("fan speed", first, FanSpeed::TOKENS)),
            Self::LightEffect => Ok(Value::LightEffect(light_effect(first)?)),
            Self::LightEffectDuration => {
                let effect = light_effect(first)?;
                let seconds = integer(second)?;
                let seconds = u64::try_from(seconds)
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| ValueShapeError::NotPositive {
                        value: second.to_string(),
                    })?;
                Ok(Value::LightEffectDuration { effect, seconds })
            }
            Self::BoundedInteger { min, max } => Ok(Value::Integer(ranged_integer(first, min, max)?)),
            Self::Text => Ok(Value::Text(non_empty(first, "value")?)),
        }
    }
}

fn number(raw: &str) -> Result<f64, ValueShapeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValueShapeError::NotANumber {
            value: raw.to_string(),
        })
}

fn integer(raw: &str) -> Result<i64, ValueShapeError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValueShapeError::NotAnInteger {
            value: raw.to_string(),
        })
}

fn ranged_number(raw: &str, min: f64, max: f64) -> Result<f64, ValueShapeError> {
    let value = number(raw)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValueShapeError::OutOfRange {
            value: raw.to_string(),
            min,
            max,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn ranged_integer(raw: &str, min: i64, max: i64) -> Result<i64, ValueShapeError> {
    let value = integer(raw)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValueShapeError::OutOfRange {
            value: raw.to_string(),
            min: min as f64,
            max: max as f64,
        })
    }
}

fn non_empty(raw: &str, field: &'static str) -> Result<String, ValueShapeError> {
    if raw.trim().is_empty() {
        Err(ValueShapeError::Empty { field })
    } else {
        Ok(raw.to_string())
    }
}

fn light_effect(raw: &str) -> Result<LightEffect, ValueShapeError> {
    LightEffect::from_token(raw)
        .ok_or_else(|| ValueShapeError::not_allowed("light effect", raw, LightEffect::TOKENS))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    fn parse(shape: ValueShape, raw: &[&str]) -> Result<Value, ValueShapeError> {
        shape.parse(CommandName::On, raw)
    }

    #[test]
    fn should_reject_any_argument_for_no_value_shape() {
        assert_eq!(parse(ValueShape::NoValue, NONE), Ok(Value::None));
        assert!(matches!(
            parse(ValueShape::NoValue, &[""]),
            Err(ValueShapeError::ValuesNotAccepted { .. })
        ));
        assert!(matches!(
            parse(ValueShape::NoValue, &["1"]),
            Err(ValueShapeError::ValuesNotAccepted { .. })
        ));
    }

    #[test]
    fn should_require_values_for_valued_shapes() {
        let err = ValueShape::Percentage
            .parse(CommandName::OpenPercent, NONE)
            .unwrap_err();
        assert_eq!(err.to_string(), "command 'open_percent' requires values");
    }

    #[test]
    fn should_check_arity() {
        assert_eq!(
            parse(ValueShape::Percentage, &["1", "2"]),
            Err(ValueShapeError::Arity {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn should_accept_percentage_bounds_inclusive() {
        assert_eq!(parse(ValueShape::Percentage, &["0"]), Ok(Value::Number(0.0)));
        assert_eq!(parse(ValueShape::Percentage, &["100"]), Ok(Value::Number(100.0)));
        assert!(matches!(
            parse(ValueShape::Percentage, &["100.5"]),
            Err(ValueShapeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn should_reject_non_numeric_and_non_finite_numbers() {
        assert!(matches!(
            parse(ValueShape::FreeFloat, &["warm"]),
            Err(ValueShapeError::NotANumber { .. })
        ));
        assert!(matches!(
            parse(ValueShape::FreeFloat, &["inf"]),
            Err(ValueShapeError::NotANumber { .. })
        ));
        assert_eq!(parse(ValueShape::FreeFloat, &[" -4.5 "]), Ok(Value::Number(-4.5)));
    }

    #[test]
    fn should_check_unit_float_range() {
        assert_eq!(parse(ValueShape::UnitFloat, &["0.5"]), Ok(Value::Number(0.5)));
        assert!(parse(ValueShape::UnitFloat, &["1.1"]).is_err());
    }

    #[test]
    fn should_reject_level_outside_one_to_five() {
        assert!(parse(ValueShape::Level, &["0"]).is_err());
        assert!(parse(ValueShape::Level, &["6"]).is_err());
        assert!(matches!(
            parse(ValueShape::Level, &["2.5"]),
            Err(ValueShapeError::NotAnInteger { .. })
        ));
        assert_eq!(parse(ValueShape::Level, &["5"]), Ok(Value::Integer(5)));
    }

    #[test]
    fn should_reject_zero_signed_delta() {
        assert_eq!(
            parse(ValueShape::SignedDelta, &["0"]),
            Err(ValueShapeError::ZeroAmount)
        );
        assert_eq!(parse(ValueShape::SignedDelta, &["-3"]), Ok(Value::Integer(-3)));
        assert!(parse(ValueShape::SignedDelta, &["4"]).is_err());
    }

    #[test]
    fn should_accept_unit_tokens_in_any_case() {
        assert_eq!(
            parse(ValueShape::ValueWithUnit, &["2", "celsius"]),
            Ok(Value::WithUnit {
                value: 2.0,
                unit: TemperatureUnit::Celsius
            })
        );
        assert_eq!(
            parse(ValueShape::ValueWithUnit, &["-3", "f"]),
            Ok(Value::WithUnit {
                value: -3.0,
                unit: TemperatureUnit::Fahrenheit
            })
        );
        let err = parse(ValueShape::ValueWithUnit, &["2", "kelvin"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid unit 'kelvin', must be one of: C, F, CELSIUS, FAHRENHEIT"
        );
    }

    #[test]
    fn should_parse_mode_and_temperature() {
        assert_eq!(
            parse(ValueShape::ModeTemperature, &["heat", "72"]),
            Ok(Value::ModeTemperature {
                mode: "heat".to_string(),
                temperature: 72.0
            })
        );
        assert_eq!(
            parse(ValueShape::ModeTemperature, &["", "72"]),
            Err(ValueShapeError::Empty { field: "mode" })
        );
    }

    #[test]
    fn should_allow_empty_mode_value_as_clear() {
        assert_eq!(
            parse(ValueShape::ModeSetting, &["wash", ""]),
            Ok(Value::ModeSetting {
                mode_id: "wash".to_string(),
                value: String::new()
            })
        );
    }

    #[test]
    fn should_parse_toggle_value_case_insensitively() {
        assert_eq!(
            parse(ValueShape::Toggle, &["eco", "TRUE"]),
            Ok(Value::Toggle {
                id: "eco".to_string(),
                enabled: true
            })
        );
        assert!(matches!(
            parse(ValueShape::Toggle, &["eco", "yes"]),
            Err(ValueShapeError::NotAllowed { .. })
        ));
    }

    #[test]
    fn should_list_fan_speeds_when_token_unknown() {
        let err = parse(ValueShape::FanSpeed, &["extreme"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid fan speed 'extreme', must be one of: low, medium, high"
        );
    }

    #[test]
    fn should_parse_light_effect_with_positive_duration() {
        assert_eq!(
            parse(ValueShape::LightEffectDuration, &["colorLoop", "30"]),
            Ok(Value::LightEffectDuration {
                effect: LightEffect::ColorLoop,
                seconds: 30
            })
        );
        assert!(matches!(
            parse(ValueShape::LightEffectDuration, &["pulse", "0"]),
            Err(ValueShapeError::NotPositive { .. })
        ));
        assert!(matches!(
            parse(ValueShape::LightEffectDuration, &["disco", "5"]),
            Err(ValueShapeError::NotAllowed { .. })
        ));
    }

    #[test]
    fn should_check_bounded_integer_range() {
        let shape = ValueShape::BoundedInteger { min: 0, max: 100 };
        assert_eq!(parse(shape, &["100"]), Ok(Value::Integer(100)));
        let err = parse(shape, &["101"]).unwrap_err();
        assert_eq!(err.to_string(), "'101' must be between 0 and 100");
    }

    #[test]
    fn should_drop_values_for_no_value_shape() {
        assert!(ValueShape::NoValue.effective_values(&["x"]).is_empty());
        assert_eq!(ValueShape::Text.effective_values(&["x"]), &["x"]);
    }

    #[test]
    fn should_reject_blank_text() {
        assert_eq!(
            parse(ValueShape::Text, &["  "]),
            Err(ValueShapeError::Empty { field: "value" })
        );
    }
}
