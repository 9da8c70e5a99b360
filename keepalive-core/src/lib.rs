//! # keepalive-core
//!
//! Keep-alive supervision of a bill validator.
//!
//! A supervisor pings the device on a fixed cadence, races each
//! acknowledgment against a timeout and moves the device between `Running`
//! and `Maintenance`. The control surface starts and stops supervision and
//! toggles the (simulated) acknowledgment.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use keepalive_core::{KeepAlive, SupervisorConfig, TracingObserver};
//!
//! #[tokio::main]
//! async fn main() -> keepalive_core::KeepaliveResult<()> {
//!     let keepalive = KeepAlive::new(SupervisorConfig::default(), Arc::new(TracingObserver))?;
//!     keepalive.start()?;
//!
//!     keepalive.set_ack(false);
//!     tokio::time::sleep(std::time::Duration::from_secs(15)).await;
//!
//!     keepalive.stop().await
//! }
//! ```

pub mod ack;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod observe;
pub mod race;
pub mod state;
pub mod supervisor;

pub use ack::{AckSource, SimulatedAck};
pub use config::SupervisorConfig;
pub use control::KeepAlive;
pub use device::{Device, DeviceSnapshot};
pub use error::{KeepaliveError, KeepaliveResult};
pub use observe::{ChannelObserver, Observation, ObservationKind, Observer, TracingObserver};
pub use race::{first_of, RaceOutcome};
pub use state::{CycleOutcome, DeviceState, SessionState, Transition};
pub use supervisor::Supervisor;
