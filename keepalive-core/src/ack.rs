//! Acknowledgment sources.

use std::future::Future;
use std::time::Duration;

use crate::device::Device;

/// Produces the acknowledgment for one keep-alive ping.
///
/// `true` means the device answered. Implementations must not block the
/// calling task; the supervisor races the returned future against its
/// timeout and drops it if the timeout or a cancellation wins.
pub trait AckSource: Send + Sync {
    fn request_ack(&self) -> impl Future<Output = bool> + Send;
}

/// Simulated device answering after a fixed latency while acknowledgments
/// are enabled, and never answering while they are disabled.
#[derive(Clone)]
pub struct SimulatedAck {
    device: Device,
    latency: Duration,
}

impl SimulatedAck {
    pub fn new(device: Device, latency: Duration) -> Self {
        Self { device, latency }
    }
}

impl AckSource for SimulatedAck {
    fn request_ack(&self) -> impl Future<Output = bool> + Send {
        // Snapshot now: a toggle during the wait does not affect this ping.
        let enabled = self.device.ack_enabled();
        let latency = self.latency;

        async move {
            if !enabled {
                return false;
            }
            tokio::time::sleep(latency).await;
            true
        }
    }
}
