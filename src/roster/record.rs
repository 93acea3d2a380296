//! Check catalog and per-user records

use crate::probe::{CheckResult, CloudResource, ExpectedSignal, ProbeError, Target};
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

/// Every check a record can carry, named by its JSON field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CheckName {
    GitFrontendBlog,
    GitBackendBlog,
    HerokuFrontendBlog,
    HerokuBackendBlog,
    GitFrontendCapstone,
    GitBackendCapstone,
    HerokuFrontendCapstone,
    HerokuBackendCapstone,
    #[strum(serialize = "has_s3_buckets")]
    HasS3Buckets,
    HasCloudfronts,
    HasElasticBeanstalks,
    HasRds,
}

impl CheckName {
    /// Checks probed over HTTP for every user
    pub fn http_checks() -> impl Iterator<Item = CheckName> {
        CheckName::iter().filter(|check| !check.is_cloud())
    }

    /// Checks that need the user's cloud account
    pub fn cloud_checks() -> impl Iterator<Item = CheckName> {
        CheckName::iter().filter(|check| check.is_cloud())
    }

    pub fn is_cloud(self) -> bool {
        matches!(
            self,
            CheckName::HasS3Buckets
                | CheckName::HasCloudfronts
                | CheckName::HasElasticBeanstalks
                | CheckName::HasRds
        )
    }

    /// The probe target for this check on `owner`'s accounts
    ///
    /// Backend deployments count as present unless they answer 404; every
    /// other HTTP check needs a 200.
    pub fn target(self, owner: &str) -> Target {
        use CheckName::*;

        match self {
            GitFrontendBlog => Target::repository(owner, "blog-frontend"),
            GitBackendBlog => Target::repository(owner, "blog-backend"),
            GitFrontendCapstone => Target::repository(owner, "capstone-frontend"),
            GitBackendCapstone => Target::repository(owner, "capstone-backend"),
            HerokuFrontendBlog => {
                Target::deployment(owner, "blog-frontend", ExpectedSignal::Ok200)
            }
            HerokuBackendBlog => Target::deployment(owner, "blog-backend", ExpectedSignal::Not404),
            HerokuFrontendCapstone => {
                Target::deployment(owner, "capstone-frontend", ExpectedSignal::Ok200)
            }
            HerokuBackendCapstone => {
                Target::deployment(owner, "capstone-backend", ExpectedSignal::Not404)
            }
            HasS3Buckets => Target::cloud(owner, CloudResource::S3Buckets),
            HasCloudfronts => Target::cloud(owner, CloudResource::Cloudfronts),
            HasElasticBeanstalks => Target::cloud(owner, CloudResource::ElasticBeanstalks),
            HasRds => Target::cloud(owner, CloudResource::Rds),
        }
    }
}

/// One user's results for one refresh cycle
///
/// Built once by the aggregator and never changed afterwards. Unknown
/// results read as `false` here; their errors are kept in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub username: String,
    pub git_frontend_blog: bool,
    pub git_backend_blog: bool,
    pub heroku_frontend_blog: bool,
    pub heroku_backend_blog: bool,
    pub git_frontend_capstone: bool,
    pub git_backend_capstone: bool,
    pub heroku_frontend_capstone: bool,
    pub heroku_backend_capstone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_s3_buckets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_cloudfronts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_elastic_beanstalks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_rds: Option<bool>,
    /// Diagnostic text for checks that ended Unknown, keyed by field name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl UserRecord {
    /// Record with every HTTP check false and no cloud fields
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Default::default()
        }
    }

    /// Assemble a record from the results of one aggregation
    pub fn from_results<I>(username: &str, results: I) -> Self
    where
        I: IntoIterator<Item = (CheckName, CheckResult)>,
    {
        let mut record = Self::new(username);
        for (check, result) in results {
            record.apply(check, &result);
        }
        record
    }

    /// Record for a user whose aggregation could not finish at all
    pub fn unavailable(username: &str, error: &ProbeError) -> Self {
        let mut record = Self::new(username);
        record
            .errors
            .insert("aggregation".to_string(), error.to_string());
        record
    }

    fn apply(&mut self, check: CheckName, result: &CheckResult) {
        if let Some(error) = result.error() {
            self.errors
                .insert(check.as_ref().to_string(), error.to_string());
        }
        self.set(check, result.exists());
    }

    fn set(&mut self, check: CheckName, value: bool) {
        use CheckName::*;

        match check {
            GitFrontendBlog => self.git_frontend_blog = value,
            GitBackendBlog => self.git_backend_blog = value,
            HerokuFrontendBlog => self.heroku_frontend_blog = value,
            HerokuBackendBlog => self.heroku_backend_blog = value,
            GitFrontendCapstone => self.git_frontend_capstone = value,
            GitBackendCapstone => self.git_backend_capstone = value,
            HerokuFrontendCapstone => self.heroku_frontend_capstone = value,
            HerokuBackendCapstone => self.heroku_backend_capstone = value,
            HasS3Buckets => self.has_s3_buckets = Some(value),
            HasCloudfronts => self.has_cloudfronts = Some(value),
            HasElasticBeanstalks => self.has_elastic_beanstalks = Some(value),
            HasRds => self.has_rds = Some(value),
        }
    }

    /// Value of one check, `None` when it did not run
    pub fn get(&self, check: CheckName) -> Option<bool> {
        use CheckName::*;

        match check {
            GitFrontendBlog => Some(self.git_frontend_blog),
            GitBackendBlog => Some(self.git_backend_blog),
            HerokuFrontendBlog => Some(self.heroku_frontend_blog),
            HerokuBackendBlog => Some(self.heroku_backend_blog),
            GitFrontendCapstone => Some(self.git_frontend_capstone),
            GitBackendCapstone => Some(self.git_backend_capstone),
            HerokuFrontendCapstone => Some(self.heroku_frontend_capstone),
            HerokuBackendCapstone => Some(self.heroku_backend_capstone),
            HasS3Buckets => self.has_s3_buckets,
            HasCloudfronts => self.has_cloudfronts,
            HasElasticBeanstalks => self.has_elastic_beanstalks,
            HasRds => self.has_rds,
        }
    }
}
