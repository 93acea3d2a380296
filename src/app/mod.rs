//! Application wiring: arguments, configuration and startup

pub mod cli;
pub mod error;
pub mod startup;

pub use error::{ConfigError, ConfigResult};
