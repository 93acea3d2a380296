//! Background refresh and the published snapshot
//!
//! [`RefreshLoop`] drives [`FanOutScheduler`] on a fixed interval and
//! publishes each complete [`Snapshot`] into the [`SnapshotCache`] that the
//! HTTP layer reads from.

pub mod cache;
pub mod refresh_loop;
pub mod scheduler;
pub mod snapshot;

pub use cache::SnapshotCache;
pub use refresh_loop::{RefreshLoop, DEFAULT_REFRESH_INTERVAL};
pub use scheduler::FanOutScheduler;
pub use snapshot::Snapshot;

#[cfg(test)]
mod tests;
