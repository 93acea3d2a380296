//! User Aggregator
//!
//! Runs every check for one user concurrently and joins on all of them
//! before building the user's record.

use super::record::{CheckName, UserRecord};
use super::user::RosterUser;
use crate::probe::{CheckResult, CloudConnector, CloudProbe, ExistenceProbe};
use futures::future::join_all;
use std::sync::Arc;

/// Builds one [`UserRecord`] per call; holds no per-user state
pub struct Aggregator {
    http: Arc<dyn ExistenceProbe>,
    cloud: Option<Arc<dyn CloudConnector>>,
}

impl Aggregator {
    pub fn new(http: Arc<dyn ExistenceProbe>) -> Self {
        Self { http, cloud: None }
    }

    /// Enable cloud checks for users that carry credentials
    pub fn with_cloud(mut self, connector: Arc<dyn CloudConnector>) -> Self {
        self.cloud = Some(connector);
        self
    }

    pub fn cloud_enabled(&self) -> bool {
        self.cloud.is_some()
    }

    /// Run every configured check for `user` and assemble the record
    ///
    /// Probe failures land in the record as `false` plus an error entry;
    /// this never fails.
    pub async fn aggregate(&self, user: &RosterUser) -> UserRecord {
        let owner = user.username.as_str();

        let http_checks = join_all(CheckName::http_checks().map(|check| async move {
            let target = check.target(owner);
            (check, self.http.check(&target).await)
        }));

        let (mut results, cloud_results) = futures::join!(http_checks, self.cloud_checks(user));
        results.extend(cloud_results);

        let record = UserRecord::from_results(owner, results);
        if !record.errors.is_empty() {
            log::debug!(
                "{}: {} check(s) could not be decided",
                owner,
                record.errors.len()
            );
        }
        record
    }

    async fn cloud_checks(&self, user: &RosterUser) -> Vec<(CheckName, CheckResult)> {
        let (Some(connector), Some(credentials)) = (&self.cloud, &user.cloud) else {
            return Vec::new();
        };

        let inventory = match connector.connect(&user.username, credentials) {
            Ok(inventory) => inventory,
            Err(error) => {
                log::warn!(
                    "Could not open cloud account for {}: {}",
                    user.username,
                    error
                );
                return CheckName::cloud_checks()
                    .map(|check| (check, CheckResult::Unknown(error.clone())))
                    .collect();
            }
        };

        let probe = CloudProbe::new(inventory);
        let owner = user.username.as_str();
        let probe = &probe;
        join_all(CheckName::cloud_checks().map(|check| async move {
            let target = check.target(owner);
            (check, probe.check(&target).await)
        }))
        .await
    }
}
