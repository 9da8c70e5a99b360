//! Control surface: session lifecycle and the acknowledgment toggle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::ack::{AckSource, SimulatedAck};
use crate::config::SupervisorConfig;
use crate::device::{Device, DeviceSnapshot};
use crate::error::{KeepaliveError, KeepaliveResult};
use crate::observe::Observer;
use crate::state::{DeviceState, SessionState};
use crate::supervisor::Supervisor;

struct ActiveSession {
    id: Uuid,
    cancel: CancellationToken,
    /// Fires once the loop task has ended, however it ended.
    finished: CancellationToken,
    /// Taken by the `stop` call that joins the task.
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Session {
    state: SessionState,
    last_id: Option<Uuid>,
    active: Option<ActiveSession>,
}

impl Session {
    fn transition(&mut self, target: SessionState) -> KeepaliveResult<()> {
        if !self.state.can_transition_to(target) {
            return Err(KeepaliveError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        tracing::debug!("Session state: {:?} -> {:?}", self.state, target);
        self.state = target;
        Ok(())
    }

    /// Stopping -> Stopped once the loop has exited. Safe to call twice.
    fn finish(&mut self) -> KeepaliveResult<()> {
        if self.state != SessionState::Stopping {
            return Ok(());
        }
        self.active = None;
        self.transition(SessionState::Stopped)
    }
}

/// Keep-alive supervision of one device.
///
/// Each `start` launches the supervisor loop as its own tokio task with a
/// fresh cancellation token; `stop` cancels it and waits for the task to
/// finish. The acknowledgment flag can be toggled at any time.
pub struct KeepAlive<A = SimulatedAck> {
    config: SupervisorConfig,
    device: Device,
    ack: A,
    session: Mutex<Session>,
}

impl KeepAlive<SimulatedAck> {
    /// Supervise a simulated device.
    pub fn new(config: SupervisorConfig, observer: Arc<dyn Observer>) -> KeepaliveResult<Self> {
        let device = Device::new(config.ack_enabled, observer);
        let ack = SimulatedAck::new(device.clone(), config.ack_latency);
        Self::with_ack_source(config, device, ack)
    }
}

impl<A> KeepAlive<A>
where
    A: AckSource + Clone + 'static,
{
    /// Supervise `device` using a custom acknowledgment source.
    pub fn with_ack_source(
        config: SupervisorConfig,
        device: Device,
        ack: A,
    ) -> KeepaliveResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            device,
            ack,
            session: Mutex::new(Session::default()),
        })
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start supervision. Must be called from within a tokio runtime.
    ///
    /// Fails with `AlreadyRunning` while a session is active and with
    /// `InvalidTransition` while the previous session is still stopping.
    pub fn start(&self) -> KeepaliveResult<Uuid> {
        let mut session = self.lock_session();
        if session.state.is_active() {
            if let Some(active) = &session.active {
                return Err(KeepaliveError::AlreadyRunning { session: active.id });
            }
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| KeepaliveError::Task(format!("no tokio runtime: {}", e)))?;
        session.transition(SessionState::Running)?;

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();
        let supervisor = Supervisor::new(self.config.clone(), self.device.clone(), self.ack.clone());
        let token = cancel.clone();
        let guard = finished.clone().drop_guard();
        let task = runtime.spawn(async move {
            let _finished = guard;
            supervisor.run(token).await
        });

        tracing::info!("Keep-alive session {} started", id);
        session.last_id = Some(id);
        session.active = Some(ActiveSession {
            id,
            cancel,
            finished,
            task: Some(task),
        });
        Ok(id)
    }

    /// Stop supervision and wait for the loop to exit.
    ///
    /// Fails with `NotRunning` if supervision was never started. Stopping an
    /// already stopped session is a no-op. Concurrent callers all return only
    /// after the loop has exited.
    pub async fn stop(&self) -> KeepaliveResult<()> {
        let (id, task, finished) = {
            let mut session = self.lock_session();
            match session.state {
                SessionState::NotStarted => return Err(KeepaliveError::NotRunning),
                SessionState::Stopped => return Ok(()),
                SessionState::Running => session.transition(SessionState::Stopping)?,
                SessionState::Stopping => {}
            }
            let active = session.active.as_mut().ok_or(KeepaliveError::NotRunning)?;
            active.cancel.cancel();
            (active.id, active.task.take(), active.finished.clone())
        };

        let Some(task) = task else {
            // Another caller is joining the task.
            finished.cancelled().await;
            return self.lock_session().finish();
        };

        let joined = task.await;
        self.lock_session().finish()?;
        joined.map_err(|e| KeepaliveError::Task(e.to_string()))?;

        tracing::info!("Keep-alive session {} stopped", id);
        Ok(())
    }

    /// Enable or disable device acknowledgments.
    pub fn set_ack(&self, enabled: bool) {
        self.device.set_ack(enabled);
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_state(&self) -> DeviceState {
        self.device.state()
    }

    pub fn ack_enabled(&self) -> bool {
        self.device.ack_enabled()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.device.snapshot()
    }

    pub fn session_state(&self) -> SessionState {
        self.lock_session().state
    }

    /// Id of the current session, or of the last one once stopped.
    pub fn session_id(&self) -> Option<Uuid> {
        self.lock_session().last_id
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }
}

impl<A> Drop for KeepAlive<A> {
    fn drop(&mut self) {
        let session = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = session.active.take() {
            active.cancel.cancel();
        }
    }
}
