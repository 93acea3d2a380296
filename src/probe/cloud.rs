//! Cloud-account resource checks
//!
//! The account API itself (session setup, request signing, response
//! decoding) sits behind [`CloudInventory`]. This module only decides what
//! each listing means.

use super::error::{ProbeError, ProbeResult};
use super::types::{CheckResult, CloudResource, Provider, Target};
use super::ExistenceProbe;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Per-user cloud account credentials from the roster file
///
/// Deserialize-only: credentials are never written back out, and `Debug`
/// redacts the secret parts.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CloudCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    pub region: String,
}

impl fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .finish()
    }
}

/// An application environment on the PaaS side of the cloud account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSummary {
    pub application_name: String,
    pub environment_name: String,
}

/// One option from an environment's configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetting {
    pub option_name: String,
    pub value: Option<String>,
}

pub const COUPLED_DATABASE_OPTION: &str = "HasCoupledDatabase";

/// Listing calls against one cloud account
#[async_trait]
pub trait CloudInventory: Send + Sync {
    async fn list_buckets(&self) -> ProbeResult<Vec<String>>;

    async fn list_distributions(&self) -> ProbeResult<Vec<String>>;

    async fn describe_environments(&self) -> ProbeResult<Vec<EnvironmentSummary>>;

    /// Option settings of one environment, flattened across its configuration sets
    async fn describe_configuration_settings(
        &self,
        environment: &EnvironmentSummary,
    ) -> ProbeResult<Vec<OptionSetting>>;
}

/// Opens a [`CloudInventory`] for a user's credentials
pub trait CloudConnector: Send + Sync {
    fn connect(
        &self,
        owner: &str,
        credentials: &CloudCredentials,
    ) -> ProbeResult<Arc<dyn CloudInventory>>;
}

/// Existence probe over one user's cloud account
pub struct CloudProbe {
    inventory: Arc<dyn CloudInventory>,
}

impl CloudProbe {
    pub fn new(inventory: Arc<dyn CloudInventory>) -> Self {
        Self { inventory }
    }

    async fn has_resource(&self, target: &Target, resource: CloudResource) -> ProbeResult<bool> {
        let signal = target.signal;
        match resource {
            CloudResource::S3Buckets => {
                let buckets = self.inventory.list_buckets().await?;
                Ok(signal.classify_len(buckets.len()))
            }
            CloudResource::Cloudfronts => {
                let distributions = self.inventory.list_distributions().await?;
                Ok(signal.classify_len(distributions.len()))
            }
            CloudResource::ElasticBeanstalks => {
                let environments = self.inventory.describe_environments().await?;
                Ok(signal.classify_len(environments.len()))
            }
            CloudResource::Rds => self.has_coupled_database().await,
        }
    }

    async fn has_coupled_database(&self) -> ProbeResult<bool> {
        let environments = self.inventory.describe_environments().await?;
        // TODO: inspect every environment; only the first one is read today,
        // so a database coupled to a later environment reports false.
        let Some(first) = environments.first() else {
            return Ok(false);
        };

        let settings = self
            .inventory
            .describe_configuration_settings(first)
            .await?;
        Ok(settings.iter().any(|option| {
            option.option_name == COUPLED_DATABASE_OPTION
                && option.value.as_deref() != Some("false")
        }))
    }
}

#[async_trait]
impl ExistenceProbe for CloudProbe {
    async fn check(&self, target: &Target) -> CheckResult {
        let Provider::Cloud(resource) = target.provider else {
            return CheckResult::Unknown(ProbeError::Unsupported {
                target: target.to_string(),
                probe: "cloud",
            });
        };

        let result = self.has_resource(target, resource).await;
        if let Err(error) = &result {
            log::warn!("Cloud probe for {} failed: {}", target, error);
        }
        result.into()
    }
}
