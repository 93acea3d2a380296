//! Per-user aggregation
//!
//! The roster is the fixed list of users loaded at startup. For each user
//! the [`Aggregator`] runs the check catalog ([`CheckName`]) and produces a
//! typed [`UserRecord`].

pub mod aggregator;
pub mod record;
pub mod user;

pub use aggregator::Aggregator;
pub use record::{CheckName, UserRecord};
pub use user::RosterUser;
