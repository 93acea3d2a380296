//! Command-line arguments

use crate::app::error::{ConfigError, ConfigResult};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Environment variable consulted when `--port` is not given
pub const PORT_ENV: &str = "PORT";

/// Polls repository, deployment and cloud checks for a roster and serves the results
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "deploywatch")]
#[command(version = crate::core::version::version())]
#[command(long_version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Listening port (overrides the PORT environment variable)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Run a single refresh cycle, print the result as JSON and exit
    #[arg(long = "once", action = ArgAction::SetTrue)]
    pub once: bool,

    /// Verbose output (can be used multiple times for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (can be used multiple times for less verbosity)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue, conflicts_with = "color")]
    pub no_color: bool,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log level
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error", "off"]
    )]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Net verbosity: each `-v` adds one, each `-q` subtracts one
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(5) as i8) - (self.quiet.min(5) as i8)
    }

    /// `--port`, else a non-empty `PORT`; an empty `PORT` counts as unset
    pub fn requested_port(&self) -> ConfigResult<Option<u16>> {
        if self.port.is_some() {
            return Ok(self.port);
        }
        match std::env::var(PORT_ENV) {
            Ok(value) if !value.trim().is_empty() => {
                value.trim().parse().map(Some).map_err(|_| {
                    ConfigError::invalid(format!(
                        "{} must be a port number, got '{}'",
                        PORT_ENV, value
                    ))
                })
            }
            _ => Ok(None),
        }
    }

    /// Colour when forced, or when stderr is a terminal and not disabled
    pub fn use_color(&self) -> bool {
        use std::io::IsTerminal;

        if self.no_color || (std::env::var_os("NO_COLOR").is_some() && !self.color) {
            return false;
        }
        self.color || std::io::stderr().is_terminal()
    }
}
