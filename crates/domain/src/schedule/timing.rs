//! Trigger-time math: durations, 12-hour clocks and calendar dates.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{DurationFormatError, HomeSimError, TimeFormatError};
use crate::time::Timestamp;

/// Meridiem marker of a 12-hour time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmPm {
    Am,
    Pm,
    /// Not stated; read as `Am`.
    Unknown,
}

impl FromStr for AmPm {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Self::Am),
            "PM" => Ok(Self::Pm),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(TimeFormatError::Meridiem(s.to_string())),
        }
    }
}

impl AmPm {
    /// Map a clock hour to 24-hour form: `12 AM` is midnight, `1..=11 PM` add twelve.
    #[must_use]
    pub fn to_24h(self, hour: u32) -> u32 {
        match (self, hour) {
            (Self::Pm, 1..=11) => hour + 12,
            (Self::Am | Self::Unknown, 12) => 0,
            _ => hour,
        }
    }
}

/// When, and for how long, a command should run.
///
/// Every field is optional; blank strings count as absent and the
/// accessors return trimmed text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTiming {
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub am_pm: Option<String>,
    #[serde(default)]
    pub delay: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

fn present(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ScheduleTiming {
    #[must_use]
    pub fn time_of_day(&self) -> Option<&str> {
        present(self.time_of_day.as_ref())
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        present(self.date.as_ref())
    }

    #[must_use]
    pub fn am_pm(&self) -> Option<&str> {
        present(self.am_pm.as_ref())
    }

    #[must_use]
    pub fn delay(&self) -> Option<&str> {
        present(self.delay.as_ref())
    }

    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        present(self.duration.as_ref())
    }

    /// Whether the command should be stored instead of applied now.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.time_of_day().is_some() || self.date().is_some() || self.delay().is_some()
    }
}

/// Parse `<integer><s|m|h>`; absent or empty text is a zero duration.
///
/// # Errors
///
/// Returns [`DurationFormatError`] for any other shape, or a value that
/// overflows.
pub fn parse_duration(text: Option<&str>) -> Result<TimeDelta, DurationFormatError> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Ok(TimeDelta::zero());
    };
    let invalid = || DurationFormatError(text.to_string());
    let (digits, unit) = text.split_at(
        text.find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len()),
    );
    if digits.is_empty() {
        return Err(invalid());
    }
    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let delta = match unit {
        "s" => TimeDelta::try_seconds(amount),
        "m" => TimeDelta::try_minutes(amount),
        "h" => TimeDelta::try_hours(amount),
        _ => None,
    };
    delta.ok_or_else(invalid)
}

/// `at` shifted by the duration `text`; absent or empty text leaves it as is.
///
/// # Errors
///
/// Returns [`DurationFormatError`] for a malformed duration, or one that
/// moves `at` outside the representable calendar.
pub fn add_duration(at: Timestamp, text: Option<&str>) -> Result<Timestamp, DurationFormatError> {
    let delta = parse_duration(text)?;
    at.checked_add_signed(delta)
        .ok_or_else(|| DurationFormatError(text.unwrap_or_default().to_string()))
}

fn parse_time_of_day(text: &str, am_pm: Option<AmPm>) -> Result<NaiveTime, TimeFormatError> {
    let invalid = || TimeFormatError::TimeOfDay(text.to_string());
    let parts = text
        .trim()
        .split(':')
        .map(|p| p.parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    let (hour, minute, second) = match parts.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };
    let hour = am_pm.map_or(hour, |marker| marker.to_24h(hour));
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}

/// Compute when a command should fire.
///
/// Without a time of day or date the trigger is `now`. Otherwise the date
/// (default: today) is combined with the time (default: midnight); a
/// time-only trigger already in the past rolls to tomorrow. The delay is
/// added last in every case.
///
/// # Errors
///
/// Returns [`HomeSimError::Time`] for a malformed time, date or meridiem
/// and [`HomeSimError::Duration`] for a malformed delay.
pub fn calculate_start_time(
    now: Timestamp,
    timing: &ScheduleTiming,
) -> Result<Timestamp, HomeSimError> {
    let start = if timing.time_of_day().is_some() || timing.date().is_some() {
        let date = match timing.date() {
            Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map_err(|_| TimeFormatError::Date(text.to_string()))?,
            None => now.date_naive(),
        };
        let time = match timing.time_of_day() {
            Some(text) => {
                let am_pm = timing.am_pm().map(str::parse::<AmPm>).transpose()?;
                parse_time_of_day(text, am_pm)?
            }
            None => NaiveTime::MIN,
        };
        let at = date.and_time(time).and_utc();
        if timing.date().is_none() && at < now {
            at.checked_add_signed(TimeDelta::days(1))
                .ok_or_else(|| TimeFormatError::Date(at.date_naive().to_string()))?
        } else {
            at
        }
    } else {
        now
    };
    add_duration(start, timing.delay()).map_err(HomeSimError::from)
}
