//! Error types for the BMS supervisor.

use thiserror::Error;

use crate::mode::{Mode, Trigger};

/// Failure to apply a trigger to the state machine.
///
/// Always fatal to the session that produced it: a trigger that the table
/// does not accept means the escalation policy and the table disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no transition for trigger {trigger:?} from state {state}")]
    NoSuchTransition { state: Mode, trigger: Trigger },

    /// A previous transition failed; the session mode can no longer be trusted.
    #[error("session aborted after a failed transition")]
    SessionAborted,
}

/// A sample line that is not a well-formed record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleParseError {
    #[error("line {line}: expected 5 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: field `{field}` has invalid value `{value}`")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: capacity must be positive, got {capacity}")]
    NonPositiveCapacity { line: usize, capacity: f64 },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for library entry points.
#[derive(Debug, Error)]
pub enum BmsError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Sample(#[from] SampleParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, BmsError>;
