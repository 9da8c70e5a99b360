//! Command-line configuration for the console front-end.

use std::time::Duration;

use keepalive_core::{KeepaliveError, KeepaliveResult, SupervisorConfig};

/// How observations are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable console lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Front-end configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Supervisor settings.
    pub supervisor: SupervisorConfig,
    /// Output format.
    pub output: OutputFormat,
}

impl CliConfig {
    /// Parse `--interval <secs>`, `--timeout <secs>` and `--json`.
    pub fn from_args<I>(args: I) -> KeepaliveResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--interval" => {
                    let interval = parse_secs(&arg, args.next())?;
                    config.supervisor = config.supervisor.with_ping_interval(interval);
                }
                "--timeout" => {
                    let timeout = parse_secs(&arg, args.next())?;
                    config.supervisor = config.supervisor.with_ack_timeout(timeout);
                }
                "--json" => config.output = OutputFormat::Json,
                other => {
                    return Err(KeepaliveError::Config(format!("unknown argument: {}", other)));
                }
            }
        }

        config.supervisor.validate()?;
        Ok(config)
    }
}

fn parse_secs(flag: &str, value: Option<String>) -> KeepaliveResult<Duration> {
    let value = value.ok_or_else(|| KeepaliveError::Config(format!("{} needs a value", flag)))?;
    let secs: f64 = value
        .parse()
        .map_err(|e| KeepaliveError::Config(format!("invalid {} value {:?}: {}", flag, value, e)))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| KeepaliveError::Config(format!("invalid {} value {:?}: {}", flag, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_config() {
        let config = CliConfig::from_args(Vec::new()).unwrap();
        assert_eq!(config.supervisor, SupervisorConfig::default());
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn custom_config() {
        let config =
            CliConfig::from_args(args(&["--interval", "3", "--timeout", "0.75", "--json"]))
                .unwrap();

        assert_eq!(config.supervisor.ping_interval, Duration::from_secs(3));
        assert_eq!(config.supervisor.ack_timeout, Duration::from_millis(750));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn bad_arguments() {
        for bad in [
            args(&["--interval"]),
            args(&["--interval", "soon"]),
            args(&["--timeout", "-1"]),
            args(&["--timeout", "0"]),
            args(&["--verbose"]),
        ] {
            assert!(matches!(
                CliConfig::from_args(bad),
                Err(KeepaliveError::Config(_))
            ));
        }
    }
}
