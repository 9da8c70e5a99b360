//! Supervisor configuration.

use std::time::Duration;

use crate::error::{KeepaliveError, KeepaliveResult};

/// Supervisor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Pause between the end of one cycle and the next ping.
    pub ping_interval: Duration,
    /// Upper bound on waiting for an acknowledgment.
    pub ack_timeout: Duration,
    /// Simulated response latency of an enabled device.
    pub ack_latency: Duration,
    /// Acknowledgment flag at construction.
    pub ack_enabled: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(10),
            ack_timeout: Duration::from_secs(2),
            ack_latency: Duration::from_millis(500),
            ack_enabled: true,
        }
    }
}

impl SupervisorConfig {
    /// Set the ping interval.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set the acknowledgment timeout.
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Set the simulated acknowledgment latency.
    pub fn with_ack_latency(mut self, latency: Duration) -> Self {
        self.ack_latency = latency;
        self
    }

    /// Set the initial acknowledgment flag.
    pub fn with_ack_enabled(mut self, enabled: bool) -> Self {
        self.ack_enabled = enabled;
        self
    }

    /// Reject zero durations for the cadence and the timeout.
    pub fn validate(&self) -> KeepaliveResult<()> {
        if self.ping_interval.is_zero() {
            return Err(KeepaliveError::Config("ping interval must be non-zero".to_string()));
        }
        if self.ack_timeout.is_zero() {
            return Err(KeepaliveError::Config("ack timeout must be non-zero".to_string()));
        }
        if self.ack_latency >= self.ack_timeout {
            tracing::warn!(
                "ack latency {:?} is not below timeout {:?}; every ping will time out",
                self.ack_latency,
                self.ack_timeout
            );
        }
        Ok(())
    }
}
