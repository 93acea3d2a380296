//! HTTP status probe for repositories and deployments

use super::error::{ProbeError, ProbeResult};
use super::types::{CheckResult, Provider, Target};
use super::ExistenceProbe;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/{owner}/{resource}";
pub const DEFAULT_DEPLOYMENT_URL: &str = "https://{owner}-{resource}.herokuapp.com";

const OWNER_PLACEHOLDER: &str = "{owner}";
const RESOURCE_PLACEHOLDER: &str = "{resource}";

/// URL templates with `{owner}` and `{resource}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplates {
    pub repository: String,
    pub deployment: String,
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY_URL.to_string(),
            deployment: DEFAULT_DEPLOYMENT_URL.to_string(),
        }
    }
}

impl UrlTemplates {
    /// Check that a template names both placeholders and an http(s) scheme
    pub fn validate_template(template: &str) -> Result<(), String> {
        if !template.starts_with("http://") && !template.starts_with("https://") {
            return Err(format!(
                "'{}' must start with http:// or https://",
                template
            ));
        }
        for placeholder in [OWNER_PLACEHOLDER, RESOURCE_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(format!("'{}' is missing {}", template, placeholder));
            }
        }
        Ok(())
    }

    /// URL for an HTTP-probed target, `None` for cloud targets
    pub fn url_for(&self, target: &Target) -> Option<String> {
        let template = match target.provider {
            Provider::SourceControl => &self.repository,
            Provider::Deployment => &self.deployment,
            Provider::Cloud(_) => return None,
        };
        Some(
            template
                .replace(OWNER_PLACEHOLDER, &target.owner)
                .replace(RESOURCE_PLACEHOLDER, &target.resource),
        )
    }
}

/// Probes repositories and deployments with a single GET
///
/// The client is shared by every probe in every cycle; redirects are
/// followed so a moved repository still answers 200.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    urls: UrlTemplates,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(urls: UrlTemplates, timeout: Duration) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("deploywatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            urls,
            timeout,
        })
    }

    async fn fetch_status(&self, url: &str) -> ProbeResult<u16> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, self.timeout, e))?;
        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl ExistenceProbe for HttpProbe {
    async fn check(&self, target: &Target) -> CheckResult {
        let Some(url) = self.urls.url_for(target) else {
            return CheckResult::Unknown(ProbeError::Unsupported {
                target: target.to_string(),
                probe: "http",
            });
        };

        let status = match self.fetch_status(&url).await {
            Ok(status) => status,
            Err(error) => {
                log::warn!("Probe for {} failed: {}", target, error);
                return CheckResult::Unknown(error);
            }
        };

        match target.signal.classify_status(status) {
            Some(true) => CheckResult::Exists,
            Some(false) => {
                log::debug!("Got {} for {}", status, url);
                CheckResult::NotExists
            }
            None => {
                log::debug!(
                    "Got {} while looking for {} on {}",
                    status,
                    target.signal,
                    url
                );
                CheckResult::Unknown(ProbeError::UnexpectedStatus {
                    url,
                    status,
                    expected: target.signal.to_string(),
                })
            }
        }
    }
}
