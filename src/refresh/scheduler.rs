//! Fan-out Scheduler
//!
//! One task per roster user, joined as a barrier. The snapshot is only
//! built after every task has finished.

use super::snapshot::Snapshot;
use crate::probe::ProbeError;
use crate::roster::{Aggregator, RosterUser, UserRecord};
use futures::future::join_all;
use std::sync::Arc;

pub struct FanOutScheduler {
    aggregator: Arc<Aggregator>,
}

impl FanOutScheduler {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }

    /// Aggregate every user concurrently and return the sorted snapshot
    ///
    /// Always returns exactly one record per user: a task that dies is
    /// replaced by an all-false record carrying the failure.
    pub async fn run_all(&self, users: &[RosterUser]) -> Snapshot {
        let handles = users.iter().cloned().map(|user| {
            let aggregator = Arc::clone(&self.aggregator);
            tokio::spawn(async move { aggregator.aggregate(&user).await })
        });

        let joined = join_all(handles).await;

        let records: Vec<UserRecord> = users
            .iter()
            .zip(joined)
            .map(|(user, outcome)| match outcome {
                Ok(record) => record,
                Err(join_error) => {
                    let error = ProbeError::TaskFailed {
                        username: user.username.clone(),
                        message: join_error.to_string(),
                    };
                    log::error!("{}", error);
                    UserRecord::unavailable(&user.username, &error)
                }
            })
            .collect();

        let undecided: usize = records.iter().map(|r| r.errors.len()).sum();
        log::debug!(
            "Aggregated {} user(s), {} undecided check(s)",
            records.len(),
            undecided
        );

        Snapshot::from_records(records)
    }
}
