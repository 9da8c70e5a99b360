//! Keep-alive supervision loop.

use tokio_util::sync::CancellationToken;

use crate::ack::AckSource;
use crate::config::SupervisorConfig;
use crate::device::Device;
use crate::observe::ObservationKind;
use crate::race::{first_of, RaceOutcome};
use crate::state::CycleOutcome;

/// Pings the device on a fixed cadence and drives its state from the
/// acknowledgments.
pub struct Supervisor<A> {
    config: SupervisorConfig,
    device: Device,
    ack: A,
}

impl<A: AckSource> Supervisor<A> {
    pub fn new(config: SupervisorConfig, device: Device, ack: A) -> Self {
        Self {
            config,
            device,
            ack,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Send one ping and apply its outcome.
    ///
    /// A `false` acknowledgment and an expired timeout are both `NoAck`.
    /// There is no retry within a cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.device.emit(ObservationKind::PingSent);

        let outcome = match first_of(self.ack.request_ack(), self.config.ack_timeout).await {
            RaceOutcome::Completed(true) => CycleOutcome::Acked,
            RaceOutcome::Completed(false) | RaceOutcome::TimedOut => CycleOutcome::NoAck,
        };

        if outcome == CycleOutcome::Acked {
            self.device.emit(ObservationKind::AckReceived);
        }
        self.device.apply(outcome);

        tracing::debug!("Keep-alive cycle resolved: {:?}", outcome);
        outcome
    }

    /// Run cycles until `cancel` fires.
    ///
    /// Cancellation is honored at the top of the loop, during the ack race
    /// and during the inter-ping sleep. A cycle cut short by cancellation
    /// leaves the device state untouched.
    pub async fn run(&self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.run_cycle() => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.ping_interval) => {}
            }
        }

        tracing::debug!("Keep-alive loop exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::SimulatedAck;
    use crate::observe::{ChannelObserver, Observation};
    use crate::state::DeviceState;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::Instant;

    use crate::observe::ObservationKind::*;

    fn supervisor(
        config: SupervisorConfig,
    ) -> (Supervisor<SimulatedAck>, UnboundedReceiver<Observation>) {
        let (observer, rx) = ChannelObserver::new();
        let device = Device::new(config.ack_enabled, Arc::new(observer));
        let ack = SimulatedAck::new(device.clone(), config.ack_latency);
        (Supervisor::new(config, device, ack), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Observation>) -> Vec<ObservationKind> {
        let mut kinds = Vec::new();
        while let Ok(obs) = rx.try_recv() {
            kinds.push(obs.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn acked_cycle_keeps_running() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());

        assert_eq!(sup.run_cycle().await, CycleOutcome::Acked);
        assert_eq!(sup.device().state(), DeviceState::Running);
        assert_eq!(drain(&mut rx), vec![PingSent, AckReceived]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_cycle_enters_maintenance() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());
        sup.device().set_ack(false);
        drain(&mut rx);

        let started = Instant::now();
        assert_eq!(sup.run_cycle().await, CycleOutcome::NoAck);

        // Disabled resolves at once instead of waiting out the timeout.
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(sup.device().state(), DeviceState::Maintenance);
        assert_eq!(drain(&mut rx), vec![PingSent, NoAck, EnteredMaintenance]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_failures_report_once() {
        let config = SupervisorConfig::default().with_ack_enabled(false);
        let (sup, mut rx) = supervisor(config);

        sup.run_cycle().await;
        sup.run_cycle().await;

        assert_eq!(sup.device().state(), DeviceState::Maintenance);
        assert_eq!(
            drain(&mut rx),
            vec![PingSent, NoAck, EnteredMaintenance, PingSent]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_successes_are_silent() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());

        sup.run_cycle().await;
        sup.run_cycle().await;

        assert_eq!(
            drain(&mut rx),
            vec![PingSent, AckReceived, PingSent, AckReceived]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn disable_then_enable_recovers() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());

        sup.device().set_ack(false);
        assert_eq!(sup.run_cycle().await, CycleOutcome::NoAck);
        sup.device().set_ack(true);
        assert_eq!(sup.run_cycle().await, CycleOutcome::Acked);

        assert_eq!(sup.device().state(), DeviceState::Running);
        assert_eq!(
            drain(&mut rx),
            vec![
                AckToggled { enabled: false },
                PingSent,
                NoAck,
                EnteredMaintenance,
                AckToggled { enabled: true },
                PingSent,
                AckReceived,
                Recovered,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_device_times_out() {
        let config = SupervisorConfig::default().with_ack_latency(Duration::from_secs(5));
        let (sup, mut rx) = supervisor(config);

        let started = Instant::now();
        assert_eq!(sup.run_cycle().await, CycleOutcome::NoAck);

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(5));
        assert_eq!(drain(&mut rx), vec![PingSent, NoAck, EnteredMaintenance]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_loop_stops_pinging() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());
        let sup = Arc::new(sup);
        let cancel = CancellationToken::new();

        let task = tokio::spawn({
            let sup = Arc::clone(&sup);
            let cancel = cancel.clone();
            async move { sup.run(cancel).await }
        });

        // Pings at 0s, 10.5s and 21s; at 25s the loop sleeps until 31.5s.
        tokio::time::sleep(Duration::from_secs(25)).await;
        let stopped_at = Instant::now();
        cancel.cancel();
        task.await.unwrap();

        // The sleep itself was cut short, not waited out.
        assert_eq!(stopped_at.elapsed(), Duration::ZERO);

        let pings_at_stop = drain(&mut rx).iter().filter(|k| **k == PingSent).count();
        assert_eq!(pings_at_stop, 3);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_inflight_race() {
        let config = SupervisorConfig::default().with_ack_latency(Duration::from_secs(5));
        let (sup, mut rx) = supervisor(config);
        let cancel = CancellationToken::new();

        let started = Instant::now();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });
        sup.run(cancel).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sup.device().state(), DeviceState::Running);
        assert_eq!(drain(&mut rx), vec![PingSent]);
    }

    #[tokio::test(start_paused = true)]
    async fn precancelled_loop_never_pings() {
        let (sup, mut rx) = supervisor(SupervisorConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        sup.run(cancel).await;
        assert!(drain(&mut rx).is_empty());
    }
}
