//! Configuration Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration file given and none found at {searched}")]
    NotFound { searched: String },

    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration: {message}")]
    Parse { message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("cannot build probe client: {message}")]
    Probe { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message } | ConfigError::Invalid { message } => Some(message),
            _ => None,
        }
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Probe { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => Some("pass --config <FILE> or create the default file"),
            ConfigError::Read { .. } => Some("check that the configuration file is readable"),
            _ => self.message(),
        }
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
