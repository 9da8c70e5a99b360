//! Error types for the keep-alive supervisor.
//!
//! A missed acknowledgment is not an error: it is the `NoAck` branch of the
//! device state machine. Errors here are lifecycle misuse and plumbing.

use thiserror::Error;

use crate::state::SessionState;

/// Keep-alive errors.
#[derive(Debug, Error)]
pub enum KeepaliveError {
    /// `start` was called while a session is already active.
    #[error("supervision already running (session {session})")]
    AlreadyRunning { session: uuid::Uuid },

    /// `stop` was called before any session was started.
    #[error("supervision not running")]
    NotRunning,

    /// Session lifecycle transition that the automaton does not allow.
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition { from: SessionState, to: SessionState },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The supervisor task ended abnormally.
    #[error("supervisor task failed: {0}")]
    Task(String),

    /// Console I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for keep-alive operations.
pub type KeepaliveResult<T> = Result<T, KeepaliveError>;
