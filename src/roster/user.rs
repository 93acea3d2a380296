//! Roster entries

use crate::probe::CloudCredentials;
use serde::Deserialize;

/// One user whose deployments are checked every cycle
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RosterUser {
    /// Hosting account name; also the identity shown in records
    pub username: String,
    /// Cloud account to inspect; cloud checks are skipped when absent
    #[serde(default)]
    pub cloud: Option<CloudCredentials>,
}

impl RosterUser {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            cloud: None,
        }
    }

    pub fn with_cloud(mut self, credentials: CloudCredentials) -> Self {
        self.cloud = Some(credentials);
        self
    }
}
