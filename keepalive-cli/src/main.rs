//! Console front-end for the bill validator keep-alive supervisor.

mod command;
mod config;
mod console;

use std::sync::Arc;

use keepalive_core::{KeepAlive, KeepaliveResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::command::{Command, HELP};
use crate::config::CliConfig;
use crate::console::Console;

#[tokio::main]
async fn main() -> KeepaliveResult<()> {
    // Logs go to stderr; stdout carries observations
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = CliConfig::from_args(std::env::args().skip(1))?;
    let console = Console::stdio(config.output);
    let keepalive = KeepAlive::new(config.supervisor.clone(), Arc::new(console.observer()))?;

    let session = keepalive.start()?;
    tracing::info!(
        "Supervising bill validator every {:?} (timeout {:?}), session {}",
        config.supervisor.ping_interval,
        config.supervisor.ack_timeout,
        session
    );

    console.notice("Bill Validator CLI started.")?;
    console.notice(HELP)?;

    let lines = BufReader::new(tokio::io::stdin()).lines();
    run_commands(lines, &keepalive, &console).await?;

    // Exit and end of input both end the session.
    keepalive.stop().await
}

/// Dispatch console lines until `exit` or end of input.
async fn run_commands<R>(
    mut lines: Lines<R>,
    keepalive: &KeepAlive,
    console: &Console,
) -> KeepaliveResult<()>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::AckOn => keepalive.set_ack(true),
            Command::AckOff => keepalive.set_ack(false),
            Command::Status => console.status(keepalive.snapshot(), keepalive.session_state())?,
            Command::Help => console.notice(HELP)?,
            Command::Exit => break,
            Command::Empty => {}
            Command::Unknown => console.notice("Unknown command.")?,
        }
    }
    Ok(())
}
