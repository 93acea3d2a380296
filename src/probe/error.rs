//! Probe Error Types

use std::time::Duration;

/// Why a single probe could not decide whether its target exists
///
/// Errors are cloned into every record that reports them, so variants hold
/// rendered messages rather than the underlying client errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected status {status} from {url} (expected {expected})")]
    UnexpectedStatus {
        url: String,
        status: u16,
        expected: String,
    },

    #[error("{operation} failed: {message}")]
    Provider { operation: String, message: String },

    #[error("{target} cannot be checked by the {probe} probe")]
    Unsupported { target: String, probe: &'static str },

    #[error("aggregation task for {username} did not complete: {message}")]
    TaskFailed { username: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    ClientBuild { message: String },
}

impl ProbeError {
    /// Map a client error onto a probe error for the given URL
    pub fn from_reqwest(url: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            ProbeError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;
