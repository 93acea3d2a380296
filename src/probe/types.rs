//! Probe targets and outcomes

use super::error::ProbeError;
use std::fmt;

/// The signal that means "this resource exists" for a family of targets
///
/// Families disagree on purpose: a deployed backend may answer 401/500 on
/// its root and still be deployed, so only a 404 counts as absent there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSignal {
    /// 200 means exists, 404 means absent, anything else is undecided
    Ok200,
    /// 404 means absent, any 2xx means exists, anything else is undecided
    Not404,
    /// A non-empty listing means exists, an empty one means absent
    NonEmptyList,
}

impl ExpectedSignal {
    /// Classify an HTTP status under this signal
    ///
    /// `None` means the status says nothing either way and the probe must
    /// report `Unknown`.
    pub fn classify_status(self, status: u16) -> Option<bool> {
        match self {
            ExpectedSignal::Ok200 => match status {
                200 => Some(true),
                404 => Some(false),
                _ => None,
            },
            ExpectedSignal::Not404 => match status {
                404 => Some(false),
                200..=299 => Some(true),
                _ => None,
            },
            ExpectedSignal::NonEmptyList => None,
        }
    }

    /// Classify the length of a provider listing
    pub fn classify_len(self, len: usize) -> bool {
        len > 0
    }
}

impl fmt::Display for ExpectedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedSignal::Ok200 => write!(f, "200 or 404"),
            ExpectedSignal::Not404 => write!(f, "2xx or 404"),
            ExpectedSignal::NonEmptyList => write!(f, "a listing"),
        }
    }
}

/// Cloud resources that can be enumerated per account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudResource {
    S3Buckets,
    Cloudfronts,
    ElasticBeanstalks,
    Rds,
}

impl fmt::Display for CloudResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudResource::S3Buckets => "s3-buckets",
            CloudResource::Cloudfronts => "cloudfront-distributions",
            CloudResource::ElasticBeanstalks => "elastic-beanstalk-environments",
            CloudResource::Rds => "coupled-rds",
        };
        write!(f, "{}", name)
    }
}

/// Which external service a target lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Source-control hosting (repositories)
    SourceControl,
    /// PaaS deployment host (apps)
    Deployment,
    /// Cloud-provider resource APIs
    Cloud(CloudResource),
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::SourceControl => write!(f, "repository"),
            Provider::Deployment => write!(f, "deployment"),
            Provider::Cloud(_) => write!(f, "cloud"),
        }
    }
}

/// One thing to probe, built from static configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub provider: Provider,
    pub owner: String,
    pub resource: String,
    pub signal: ExpectedSignal,
}

impl Target {
    pub fn repository(owner: &str, repo: &str) -> Self {
        Self {
            provider: Provider::SourceControl,
            owner: owner.to_string(),
            resource: repo.to_string(),
            signal: ExpectedSignal::Ok200,
        }
    }

    pub fn deployment(owner: &str, app: &str, signal: ExpectedSignal) -> Self {
        Self {
            provider: Provider::Deployment,
            owner: owner.to_string(),
            resource: app.to_string(),
            signal,
        }
    }

    pub fn cloud(owner: &str, resource: CloudResource) -> Self {
        Self {
            provider: Provider::Cloud(resource),
            owner: owner.to_string(),
            resource: resource.to_string(),
            signal: ExpectedSignal::NonEmptyList,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.provider, self.owner, self.resource)
    }
}

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Exists,
    NotExists,
    Unknown(ProbeError),
}

impl CheckResult {
    pub fn from_bool(exists: bool) -> Self {
        if exists {
            CheckResult::Exists
        } else {
            CheckResult::NotExists
        }
    }

    /// Display value: only a positive answer counts as existing
    pub fn exists(&self) -> bool {
        matches!(self, CheckResult::Exists)
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            CheckResult::Unknown(error) => Some(error),
            _ => None,
        }
    }
}

impl From<Result<bool, ProbeError>> for CheckResult {
    fn from(result: Result<bool, ProbeError>) -> Self {
        match result {
            Ok(exists) => CheckResult::from_bool(exists),
            Err(error) => CheckResult::Unknown(error),
        }
    }
}
