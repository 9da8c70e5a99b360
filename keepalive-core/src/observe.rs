//! Observations emitted by the supervisor and the control surface.
//!
//! The console text is informational only; the event kinds and the
//! conditions that trigger them are what callers can rely on.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::mpsc;

/// Kind of an observable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObservationKind {
    /// A keep-alive ping went out.
    PingSent,
    /// The device acknowledged the ping in time.
    AckReceived,
    /// Maintenance -> Running.
    Recovered,
    /// The ping was not acknowledged within the timeout.
    NoAck,
    /// Running -> Maintenance.
    EnteredMaintenance,
    /// The acknowledgment flag was set.
    AckToggled { enabled: bool },
}

/// A timestamped event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub at: DateTime<Local>,
    #[serde(flatten)]
    pub kind: ObservationKind,
}

impl Observation {
    /// Stamp an event with the current local time.
    pub fn now(kind: ObservationKind) -> Self {
        Self {
            at: Local::now(),
            kind,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.at.format("%H:%M:%S"))?;
        match self.kind {
            ObservationKind::PingSent => write!(f, "Sending keep-alive ping..."),
            ObservationKind::AckReceived => write!(f, "ACK received."),
            ObservationKind::Recovered => write!(f, "Device recovered. Transitioning to RUNNING."),
            ObservationKind::NoAck => write!(f, "ERROR: No ACK received within timeout."),
            ObservationKind::EnteredMaintenance => write!(f, "Transitioning to MAINTENANCE mode."),
            ObservationKind::AckToggled { enabled } => {
                write!(f, "ACK set to: {}", if enabled { "ON" } else { "OFF" })
            }
        }
    }
}

/// Sink for observations.
///
/// Called from inside the device lock when the event accompanies a state or
/// flag change, so implementations must not block.
pub trait Observer: Send + Sync {
    fn observe(&self, observation: &Observation);
}

/// Forwards observations to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, observation: &Observation) {
        match observation.kind {
            ObservationKind::NoAck => tracing::error!("{}", observation),
            ObservationKind::EnteredMaintenance => tracing::warn!("{}", observation),
            _ => tracing::info!("{}", observation),
        }
    }
}

/// Forwards observations into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Observation>,
}

impl ChannelObserver {
    /// Create an observer together with its receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Observation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn observe(&self, observation: &Observation) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.tx.send(observation.clone());
    }
}
