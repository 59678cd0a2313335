// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for building and ticking sequences.

use thiserror::Error;

/// Errors raised while a sequence is being ticked
#[derive(Debug, Error)]
pub enum SequenceError {
    /// A condition or action hook rejected the supplied context
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// An action hook failed
    #[error("Action failed: {0}")]
    Action(String),

    /// Any other error raised inside a hook
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SequenceError {
    /// Create an invalid-context error
    pub fn invalid_context(reason: impl Into<String>) -> Self {
        Self::InvalidContext(reason.into())
    }

    /// Create an action failure
    pub fn action(reason: impl Into<String>) -> Self {
        Self::Action(reason.into())
    }
}

/// Result type for tick-time operations
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Malformed builder chains, reported by `done()`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderMisuseError {
    /// `.or(...)` without a preceding `.if_(...).then(...)`
    #[error("`or` used without a preceding `if_`/`then`")]
    OrWithoutIf,

    /// `.or_if(...)` without a preceding `.if_(...).then(...)`
    #[error("`or_if` used without a preceding `if_`/`then`")]
    OrIfWithoutIf,

    /// A guard was opened but never given a consequent
    #[error("`if_` guard is missing its `then`")]
    MissingThen,

    /// `if_all` called with no guards
    #[error("`if_all` needs at least one guard")]
    EmptyIf,

    /// More than one repetition policy on the same sequence
    #[error("repetition policy already set")]
    RepeatAlreadySet,

    /// `repeat(0)`
    #[error("repeat count must be at least 1")]
    ZeroRepeatCount,

    /// `random_one_of` with nothing to choose from
    #[error("random choice needs at least one alternative")]
    EmptyChoice,

    /// Probability outside `[0, 1]`
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// Weights rejected by the weighted distribution
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Negative or non-finite wait duration
    #[error("invalid wait duration: {0}")]
    InvalidDuration(f32),
}

/// Error when loading or saving sequencer settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Settings parsed but hold invalid values
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
