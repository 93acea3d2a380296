//! Process-wide infrastructure: logging, shutdown, fatal error reporting

pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod version;
