//! Console output.
//!
//! Observations and `status` go to stdout. Banner, help and prompts go to
//! stdout in text mode and to stderr in JSON mode, so that stdout stays one
//! JSON object per line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use keepalive_core::{
    DeviceSnapshot, KeepaliveError, KeepaliveResult, Observation, Observer, SessionState,
};
use serde::Serialize;

use crate::config::OutputFormat;

/// Shared line-oriented output stream.
pub type Sink = Arc<Mutex<dyn Write + Send>>;

fn write_line(sink: &Sink, line: &str) -> io::Result<()> {
    let mut out = sink.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out, "{}", line)?;
    out.flush()
}

/// Writes observations to the console's data stream.
#[derive(Clone)]
pub struct ConsoleObserver {
    format: OutputFormat,
    out: Sink,
}

impl Observer for ConsoleObserver {
    fn observe(&self, observation: &Observation) {
        let written = render(self.format, observation)
            .and_then(|line| write_line(&self.out, &line).map_err(KeepaliveError::from));
        if let Err(e) = written {
            tracing::error!("Failed to write observation: {}", e);
        }
    }
}

/// Console front-end output.
#[derive(Clone)]
pub struct Console {
    format: OutputFormat,
    out: Sink,
    err: Sink,
}

impl Console {
    pub fn new(format: OutputFormat, out: Sink, err: Sink) -> Self {
        Self { format, out, err }
    }

    /// Console on the process's stdout and stderr.
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(
            format,
            Arc::new(Mutex::new(io::stdout())),
            Arc::new(Mutex::new(io::stderr())),
        )
    }

    pub fn observer(&self) -> ConsoleObserver {
        ConsoleObserver {
            format: self.format,
            out: Arc::clone(&self.out),
        }
    }

    /// Write human-facing text that is not part of the data stream.
    pub fn notice(&self, text: &str) -> KeepaliveResult<()> {
        let sink = match self.format {
            OutputFormat::Text => &self.out,
            OutputFormat::Json => &self.err,
        };
        write_line(sink, text)?;
        Ok(())
    }

    /// Write the `status` command output.
    pub fn status(&self, device: DeviceSnapshot, session: SessionState) -> KeepaliveResult<()> {
        let line = render_status(self.format, device, session)?;
        write_line(&self.out, &line)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct Status {
    #[serde(flatten)]
    device: DeviceSnapshot,
    session: SessionState,
}

/// Render an observation as one output line.
pub fn render(format: OutputFormat, observation: &Observation) -> KeepaliveResult<String> {
    match format {
        OutputFormat::Text => Ok(observation.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string(observation)?),
    }
}

/// Render the `status` command output.
pub fn render_status(
    format: OutputFormat,
    device: DeviceSnapshot,
    session: SessionState,
) -> KeepaliveResult<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "Device: {}  ACK: {}  Session: {}",
            device.state,
            if device.ack_enabled { "ON" } else { "OFF" },
            session
        )),
        OutputFormat::Json => Ok(serde_json::to_string(&Status { device, session })?),
    }
}
