use thiserror::Error;

use crate::session::Phase;

/// Settings that can never start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("goal must be at least 1 point")]
    NonPositiveGoal,

    #[error("session must last at least 1 minute")]
    NonPositiveDuration,

    #[error("at least one category group must be enabled")]
    NoGroupsEnabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The operation is not allowed in the session's current phase.
    #[error("cannot {operation} while the session is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    #[error("invalid settings: {0}")]
    InvalidConfig(#[from] ConfigError),
}
