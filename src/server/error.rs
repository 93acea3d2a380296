//! Server Error Types

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for ServerError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ServerError::Bind { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ServerError::Bind { .. } => {
                Some("the listening port is unavailable; set PORT or --port")
            }
            ServerError::Serve { .. } => None,
        }
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
