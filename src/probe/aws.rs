//! [`CloudInventory`] over the AWS SDK
//!
//! Each roster user gets their own set of clients built from the static
//! credentials in the roster file. Nothing is read from the process
//! environment or shared profiles.

use super::cloud::{
    CloudConnector, CloudCredentials, CloudInventory, EnvironmentSummary, OptionSetting,
};
use super::error::{ProbeError, ProbeResult};
use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::operation::describe_configuration_settings::DescribeConfigurationSettingsOutput;
use aws_sdk_elasticbeanstalk::operation::describe_environments::DescribeEnvironmentsOutput;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::list_buckets::ListBucketsOutput;
use std::sync::Arc;
use std::time::Duration;

const PROVIDER_NAME: &str = "deploywatch-roster";

// Same configuration for every service crate; each re-exports its own types.
macro_rules! service_client {
    ($sdk:ident, $credentials:expr, $timeout:expr) => {{
        use $sdk::config::timeout::TimeoutConfig;
        use $sdk::config::{BehaviorVersion, Credentials, Region};

        let credentials: &CloudCredentials = $credentials;
        let config = $sdk::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                credentials.session_token.clone(),
                None,
                PROVIDER_NAME,
            ))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout($timeout)
                    .build(),
            )
            .build();
        $sdk::Client::from_conf(config)
    }};
}

/// Opens an [`AwsInventory`] per user
#[derive(Debug, Clone, Copy)]
pub struct AwsConnector {
    timeout: Duration,
}

impl AwsConnector {
    /// `timeout` bounds each API operation, retries included
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CloudConnector for AwsConnector {
    fn connect(
        &self,
        owner: &str,
        credentials: &CloudCredentials,
    ) -> ProbeResult<Arc<dyn CloudInventory>> {
        if credentials.region.trim().is_empty() {
            return Err(ProbeError::Provider {
                operation: format!("connect for {}", owner),
                message: "cloud region is empty".to_string(),
            });
        }
        log::debug!("Opening cloud account for {} in {}", owner, credentials.region);

        Ok(Arc::new(AwsInventory {
            s3: service_client!(aws_sdk_s3, credentials, self.timeout),
            cloudfront: service_client!(aws_sdk_cloudfront, credentials, self.timeout),
            beanstalk: service_client!(aws_sdk_elasticbeanstalk, credentials, self.timeout),
        }))
    }
}

pub struct AwsInventory {
    s3: aws_sdk_s3::Client,
    cloudfront: aws_sdk_cloudfront::Client,
    beanstalk: aws_sdk_elasticbeanstalk::Client,
}

fn provider_error<E>(operation: &str, error: E) -> ProbeError
where
    E: std::error::Error + 'static,
{
    ProbeError::Provider {
        operation: operation.to_string(),
        message: DisplayErrorContext(&error).to_string(),
    }
}

fn bucket_names(output: &ListBucketsOutput) -> Vec<String> {
    output
        .buckets()
        .iter()
        .filter_map(|bucket| bucket.name().map(str::to_string))
        .collect()
}

fn environment_summaries(output: &DescribeEnvironmentsOutput) -> Vec<EnvironmentSummary> {
    output
        .environments()
        .iter()
        .map(|environment| EnvironmentSummary {
            application_name: environment.application_name().unwrap_or_default().to_string(),
            environment_name: environment.environment_name().unwrap_or_default().to_string(),
        })
        .collect()
}

fn option_settings(output: &DescribeConfigurationSettingsOutput) -> Vec<OptionSetting> {
    output
        .configuration_settings()
        .iter()
        .flat_map(|settings| settings.option_settings())
        .filter_map(|option| {
            Some(OptionSetting {
                option_name: option.option_name()?.to_string(),
                value: option.value().map(str::to_string),
            })
        })
        .collect()
}

#[async_trait]
impl CloudInventory for AwsInventory {
    async fn list_buckets(&self) -> ProbeResult<Vec<String>> {
        let output = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| provider_error("s3:ListBuckets", e))?;
        Ok(bucket_names(&output))
    }

    async fn list_distributions(&self) -> ProbeResult<Vec<String>> {
        let output = self
            .cloudfront
            .list_distributions()
            .send()
            .await
            .map_err(|e| provider_error("cloudfront:ListDistributions", e))?;
        Ok(output
            .distribution_list()
            .map(|list| {
                list.items()
                    .iter()
                    .map(|summary| summary.id().to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn describe_environments(&self) -> ProbeResult<Vec<EnvironmentSummary>> {
        let output = self
            .beanstalk
            .describe_environments()
            .send()
            .await
            .map_err(|e| provider_error("elasticbeanstalk:DescribeEnvironments", e))?;
        Ok(environment_summaries(&output))
    }

    async fn describe_configuration_settings(
        &self,
        environment: &EnvironmentSummary,
    ) -> ProbeResult<Vec<OptionSetting>> {
        let output = self
            .beanstalk
            .describe_configuration_settings()
            .application_name(&environment.application_name)
            .environment_name(&environment.environment_name)
            .send()
            .await
            .map_err(|e| provider_error("elasticbeanstalk:DescribeConfigurationSettings", e))?;
        Ok(option_settings(&output))
    }
}
