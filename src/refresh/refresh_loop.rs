//! Refresh Loop
//!
//! Alternates between refreshing and sleeping until shutdown. Check
//! failures never stop it; a cycle where everything failed still publishes.

use super::cache::SnapshotCache;
use super::scheduler::FanOutScheduler;
use super::snapshot::Snapshot;
use crate::core::shutdown::ShutdownCoordinator;
use crate::roster::RosterUser;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Refreshing,
    Sleeping,
}

pub struct RefreshLoop {
    scheduler: FanOutScheduler,
    roster: Arc<[RosterUser]>,
    cache: Arc<SnapshotCache>,
    interval: Duration,
}

impl RefreshLoop {
    pub fn new(
        scheduler: FanOutScheduler,
        roster: Vec<RosterUser>,
        cache: Arc<SnapshotCache>,
        interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            roster: roster.into(),
            cache,
            interval,
        }
    }

    /// Run one full cycle and publish its snapshot
    pub async fn refresh_once(&self) -> Arc<Snapshot> {
        log::info!("Fetching deploys for {} user(s)...", self.roster.len());
        let started = Instant::now();
        let snapshot = self.scheduler.run_all(&self.roster).await;
        log::info!(
            "Fetching deploys...done in {:.1}s",
            started.elapsed().as_secs_f64()
        );

        let published = self.cache.publish(snapshot);
        log::debug!("Published snapshot with {} record(s)", published.len());
        published
    }

    /// Refresh until `shutdown` fires; returns the number of completed cycles
    ///
    /// Shutdown is observed between cycles and while sleeping. An in-flight
    /// cycle always runs to completion and publishes.
    pub async fn run(self, shutdown: ShutdownCoordinator) -> u64 {
        let mut cycles = 0u64;
        let mut state = LoopState::Refreshing;

        loop {
            state = match state {
                LoopState::Refreshing => {
                    if shutdown.is_shutdown_requested() {
                        break;
                    }
                    self.refresh_once().await;
                    cycles += 1;
                    LoopState::Sleeping
                }
                LoopState::Sleeping => {
                    log::debug!("Sleeping for {:?}", self.interval);
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => LoopState::Refreshing,
                        _ = shutdown.wait() => break,
                    }
                }
            };
        }

        log::info!("Refresh loop stopped after {} cycle(s)", cycles);
        cycles
    }
}
