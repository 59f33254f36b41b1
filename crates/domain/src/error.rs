//! Error types shared by the engine and the application layer.
//!
//! Each concern has its own typed error; [`HomeSimError`] aggregates them
//! through `#[from]` conversions so callers can match on one enum.

/// Top-level error returned by dispatch, scheduling and the services built on them.
#[derive(Debug, thiserror::Error)]
pub enum HomeSimError {
    /// The command identifier is not part of the registry.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// Raw arguments do not satisfy the command's value shape.
    #[error("invalid value: {0}")]
    Value(#[from] ValueShapeError),

    /// A duration string is not `<integer><s|m|h>`.
    #[error(transparent)]
    Duration(#[from] DurationFormatError),

    /// A time-of-day, date or meridiem token could not be understood.
    #[error(transparent)]
    Time(#[from] TimeFormatError),

    /// A stored state does not hold the kind of value a rule expects.
    #[error(transparent)]
    State(#[from] StateError),

    /// A device record breaks a structural invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The requested device does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The device does not declare the trait owning the command.
    #[error("device {device} does not support trait '{trait_name}'")]
    UnsupportedTrait { device: String, trait_name: String },
}

/// Failures raised while turning raw string arguments into a typed value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueShapeError {
    /// A command without values received at least one argument.
    #[error("command '{command}' does not accept values")]
    ValuesNotAccepted { command: String },

    /// A command that needs values received none.
    #[error("command '{command}' requires values")]
    ValuesRequired { command: String },

    /// Wrong number of arguments.
    #[error("expected {expected} value(s), got {actual}")]
    Arity { expected: usize, actual: usize },

    /// The argument is not a number.
    #[error("'{value}' is not a valid number")]
    NotANumber { value: String },

    /// The argument is not an integer.
    #[error("'{value}' is not a valid integer")]
    NotAnInteger { value: String },

    /// The argument lies outside its inclusive range.
    #[error("'{value}' must be between {min} and {max}")]
    OutOfRange { value: String, min: f64, max: f64 },

    /// The argument must be an integer greater than zero.
    #[error("'{value}' must be a positive integer")]
    NotPositive { value: String },

    /// A rule received a value parsed for a different shape.
    #[error("expected a {expected} value")]
    WrongShape { expected: &'static str },

    /// Ambiguous amounts are signed steps and cannot be zero.
    #[error("ambiguous amount cannot be zero")]
    ZeroAmount,

    /// The argument must be a non-empty string.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// The argument is not one of a closed set of tokens.
    #[error("invalid {field} '{value}', must be one of: {allowed}")]
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: String,
    },
}

impl ValueShapeError {
    /// Build a [`ValueShapeError::NotAllowed`] listing `allowed` comma-separated.
    #[must_use]
    pub fn not_allowed<S: AsRef<str>>(field: &'static str, value: &str, allowed: &[S]) -> Self {
        Self::NotAllowed {
            field,
            value: value.to_string(),
            allowed: allowed
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Malformed duration text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration format: '{0}'")]
pub struct DurationFormatError(pub String);

/// Malformed schedule timing input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeFormatError {
    #[error("invalid time of day: '{0}'")]
    TimeOfDay(String),
    #[error("invalid date: '{0}'")]
    Date(String),
    #[error("invalid meridiem '{0}', must be one of: AM, PM, UNKNOWN")]
    Meridiem(String),
}

/// A stored state cannot be read as the kind a rule needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("state '{state}' does not hold a {expected} value")]
pub struct StateError {
    pub state: String,
    pub expected: &'static str,
}

/// Structural invariant violations on a device record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("device id must not be empty")]
    EmptyId,
    #[error("state '{0}' appears more than once")]
    DuplicateState(String),
}

/// A due schedule entry failed to apply; the entry is dropped, not retried.
#[derive(Debug, thiserror::Error)]
#[error("scheduled '{action}' on device {device_id} failed: {source}")]
pub struct ScheduleApplicationError {
    pub device_id: String,
    pub action: String,
    pub source: HomeSimError,
}

/// Lookup of a missing resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
