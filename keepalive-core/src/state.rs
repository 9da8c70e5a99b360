//! State machine definitions for the supervised device and the supervision
//! session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device state automaton states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// Device answers pings in time.
    #[default]
    Running,
    /// Degraded mode after a ping went unacknowledged.
    Maintenance,
}

impl DeviceState {
    /// Transition produced by a resolved ping, if any.
    ///
    /// Re-applying an outcome that leads to the current state yields `None`,
    /// so callers never report the same transition twice.
    pub fn on_outcome(self, outcome: CycleOutcome) -> Option<Transition> {
        match (self, outcome) {
            (Self::Maintenance, CycleOutcome::Acked) => Some(Transition::Recovered),
            (Self::Running, CycleOutcome::NoAck) => Some(Transition::EnteredMaintenance),
            (Self::Running, CycleOutcome::Acked) | (Self::Maintenance, CycleOutcome::NoAck) => {
                None
            }
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Maintenance => write!(f, "MAINTENANCE"),
        }
    }
}

/// Resolved result of one keep-alive ping.
///
/// A disabled acknowledgment and an expired timeout both resolve to `NoAck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    Acked,
    NoAck,
}

/// A device state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Maintenance -> Running.
    Recovered,
    /// Running -> Maintenance.
    EnteredMaintenance,
}

impl Transition {
    /// State the device is in after this transition.
    pub fn target(self) -> DeviceState {
        match self {
            Self::Recovered => DeviceState::Running,
            Self::EnteredMaintenance => DeviceState::Maintenance,
        }
    }
}

/// Supervision session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// `start` has never been called.
    #[default]
    NotStarted,
    /// A supervisor loop is active.
    Running,
    /// Cancellation was signaled; the loop has not exited yet.
    Stopping,
    /// The last session was stopped.
    Stopped,
}

impl SessionState {
    /// Get valid transitions from current state.
    pub fn valid_transitions(&self) -> &'static [SessionState] {
        match self {
            Self::NotStarted => &[Self::Running],
            Self::Running => &[Self::Stopping],
            Self::Stopping => &[Self::Stopped],
            Self::Stopped => &[Self::Running],
        }
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
