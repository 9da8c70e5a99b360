//! Shared device state.
//!
//! `DeviceState` and the acknowledgment flag live behind one mutex. Every
//! access takes the lock exactly once, and observations that accompany a
//! mutation are emitted before the lock is released, so a toggle racing a
//! ping is seen either wholly before or wholly after it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::observe::{Observation, ObservationKind, Observer};
use crate::state::{CycleOutcome, DeviceState, Transition};

#[derive(Debug)]
struct DeviceInner {
    state: DeviceState,
    ack_enabled: bool,
}

/// Consistent view of the device taken under a single lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub state: DeviceState,
    pub ack_enabled: bool,
}

/// Handle to the supervised device. Clones share the same state.
///
/// Outside this crate the state can be read and the acknowledgment flag set,
/// but only the supervisor moves the device between states:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use keepalive_core::{CycleOutcome, Device, TracingObserver};
///
/// let device = Device::new(true, Arc::new(TracingObserver));
/// device.apply(CycleOutcome::NoAck);
/// ```
#[derive(Clone)]
pub struct Device {
    inner: Arc<Mutex<DeviceInner>>,
    observer: Arc<dyn Observer>,
}

impl Device {
    /// Create a device in `Running` state.
    pub fn new(ack_enabled: bool, observer: Arc<dyn Observer>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DeviceInner {
                state: DeviceState::Running,
                ack_enabled,
            })),
            observer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceInner> {
        // Critical sections never panic midway, so a poisoned lock still
        // holds consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current device state.
    pub fn state(&self) -> DeviceState {
        self.lock().state
    }

    /// Current acknowledgment flag.
    pub fn ack_enabled(&self) -> bool {
        self.lock().ack_enabled
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        let inner = self.lock();
        DeviceSnapshot {
            state: inner.state,
            ack_enabled: inner.ack_enabled,
        }
    }

    /// Set the acknowledgment flag and report the new value.
    pub fn set_ack(&self, enabled: bool) {
        let mut inner = self.lock();
        inner.ack_enabled = enabled;
        self.observer
            .observe(&Observation::now(ObservationKind::AckToggled { enabled }));
    }

    /// Apply a resolved ping to the device state.
    ///
    /// Returns the transition taken, or `None` when the device was already
    /// in the state the outcome leads to. Nothing is emitted in that case.
    pub(crate) fn apply(&self, outcome: CycleOutcome) -> Option<Transition> {
        let mut inner = self.lock();
        let transition = inner.state.on_outcome(outcome)?;

        match transition {
            Transition::Recovered => {
                self.emit(ObservationKind::Recovered);
            }
            Transition::EnteredMaintenance => {
                self.emit(ObservationKind::NoAck);
                self.emit(ObservationKind::EnteredMaintenance);
            }
        }

        tracing::debug!("Device state: {:?} -> {:?}", inner.state, transition.target());
        inner.state = transition.target();
        Some(transition)
    }

    /// Emit an observation that does not touch shared state.
    pub(crate) fn emit(&self, kind: ObservationKind) {
        self.observer.observe(&Observation::now(kind));
    }
}
