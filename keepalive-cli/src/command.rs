//! Console commands.

/// A parsed console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `device bill_validator ack on`
    AckOn,
    /// `device bill_validator ack off`
    AckOff,
    Status,
    Help,
    Exit,
    /// Blank line.
    Empty,
    Unknown,
}

impl Command {
    /// Parse a line. Case and surrounding or repeated whitespace are ignored.
    pub fn parse(line: &str) -> Self {
        let normalized = line
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "" => Self::Empty,
            "device bill_validator ack on" => Self::AckOn,
            "device bill_validator ack off" => Self::AckOff,
            "status" => Self::Status,
            "help" => Self::Help,
            "exit" => Self::Exit,
            _ => Self::Unknown,
        }
    }
}

/// Command list shown at startup and on `help`.
pub const HELP: &str = "\
Commands:
  device bill_validator ack on
  device bill_validator ack off
  status
  help
  exit";
