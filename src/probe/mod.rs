//! Existence Checker
//!
//! A probe answers one question about one [`Target`]: does it exist? The
//! answer is a [`CheckResult`], never an error, so callers can fan out many
//! probes and keep every answer.
//!
//! - [`HttpProbe`]: repositories and deployments, by HTTP status
//! - [`CloudProbe`]: cloud-account resources, by listing size
//! - [`AwsConnector`]: opens a user's cloud account for [`CloudProbe`]

pub mod aws;
pub mod cloud;
pub mod error;
pub mod http;
pub mod types;

pub use aws::{AwsConnector, AwsInventory};
pub use cloud::{CloudConnector, CloudCredentials, CloudInventory, CloudProbe};
pub use error::{ProbeError, ProbeResult};
pub use http::{HttpProbe, UrlTemplates};
pub use types::{CheckResult, CloudResource, ExpectedSignal, Provider, Target};

use async_trait::async_trait;

/// Performs one externally observable existence check
///
/// Implementations make a single attempt, bounded by their own timeout, and
/// report failures as [`CheckResult::Unknown`].
#[async_trait]
pub trait ExistenceProbe: Send + Sync {
    async fn check(&self, target: &Target) -> CheckResult;
}
