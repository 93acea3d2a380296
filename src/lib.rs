//! Deployment status poller
//!
//! Periodically checks a fixed roster of users for repositories, PaaS
//! deployments and cloud resources, and serves the latest complete result
//! set over a read-only HTTP endpoint.

pub mod app;
pub mod core;
pub mod probe;
pub mod refresh;
pub mod roster;
pub mod server;
