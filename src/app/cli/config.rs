//! TOML configuration file loading
//!
//! The file holds the roster, optional per-user cloud credentials and a few
//! tuning knobs. It is read once at startup; any problem is fatal.

use crate::app::error::{ConfigError, ConfigResult};
use crate::probe::http::{DEFAULT_DEPLOYMENT_URL, DEFAULT_PROBE_TIMEOUT, DEFAULT_REPOSITORY_URL};
use crate::probe::UrlTemplates;
use crate::refresh::DEFAULT_REFRESH_INTERVAL;
use crate::roster::RosterUser;
use crate::server::DEFAULT_PORT;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshSection {
    pub interval_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSection {
    pub repository_url: String,
    pub deployment_url: String,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            repository_url: DEFAULT_REPOSITORY_URL.to_string(),
            deployment_url: DEFAULT_DEPLOYMENT_URL.to_string(),
        }
    }
}

/// Parsed and validated configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub refresh: RefreshSection,
    #[serde(default)]
    pub probes: ProbeSection,
    #[serde(default)]
    pub users: Vec<RosterUser>,
}

impl Config {
    /// `<config_dir>/Deploywatch/deploywatch.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Deploywatch").join("deploywatch.toml"))
    }

    /// Load from `path`, or from the default location when `None`
    pub async fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(default) if default.exists() => default,
                default => {
                    return Err(ConfigError::NotFound {
                        searched: default
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<no config directory>".to_string()),
                    })
                }
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let config = Self::from_toml_str(&contents)?;
        log::debug!(
            "Loaded configuration from {} with {} user(s)",
            path.display(),
            config.users.len()
        );
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::invalid("refresh.interval_secs must be greater than 0"));
        }
        if self.refresh.probe_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "refresh.probe_timeout_secs must be greater than 0",
            ));
        }

        UrlTemplates::validate_template(&self.probes.repository_url)
            .map_err(|e| ConfigError::invalid(format!("probes.repository_url: {}", e)))?;
        UrlTemplates::validate_template(&self.probes.deployment_url)
            .map_err(|e| ConfigError::invalid(format!("probes.deployment_url: {}", e)))?;

        let mut seen = HashSet::new();
        for (index, user) in self.users.iter().enumerate() {
            let name = user.username.as_str();
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "users[{}].username cannot be empty",
                    index
                )));
            }
            if name.chars().any(|c| c.is_whitespace() || c == '/') {
                return Err(ConfigError::invalid(format!(
                    "users[{}].username '{}' contains whitespace or '/'",
                    index, name
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::invalid(format!(
                    "users[{}].username '{}' is listed more than once",
                    index, name
                )));
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh.probe_timeout_secs)
    }

    pub fn url_templates(&self) -> UrlTemplates {
        UrlTemplates {
            repository: self.probes.repository_url.clone(),
            deployment: self.probes.deployment_url.clone(),
        }
    }

    /// Command line / `PORT` first, then the file, then the default
    pub fn resolve_port(&self, from_args: Option<u16>) -> u16 {
        from_args.or(self.server.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn users_with_cloud(&self) -> usize {
        self.users.iter().filter(|u| u.cloud.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
        [server]
        port = 8080

        [refresh]
        interval_secs = 60
        probe_timeout_secs = 3

        [probes]
        repository_url = "http://127.0.0.1:9999/{owner}/{resource}"
        deployment_url = "http://127.0.0.1:9999/apps/{owner}-{resource}"

        [[users]]
        username = "de1ux"

        [[users]]
        username = "zhafner"
        [users.cloud]
        access_key_id = "AKIAEXAMPLE"
        secret_access_key = "secret"
        region = "us-east-1"
    "#;

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(FULL).unwrap();

        assert_eq!(config.resolve_port(None), 8080);
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users_with_cloud(), 1);
        assert_eq!(
            config.users[1].cloud.as_ref().map(|c| c.region.as_str()),
            Some("us-east-1")
        );
        assert_eq!(
            config.url_templates().deployment,
            "http://127.0.0.1:9999/apps/{owner}-{resource}"
        );
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let config = Config::from_toml_str("[[users]]\nusername = \"dougMR\"\n").unwrap();

        assert_eq!(config.resolve_port(None), DEFAULT_PORT);
        assert_eq!(config.refresh_interval(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.probe_timeout(), DEFAULT_PROBE_TIMEOUT);
        assert_eq!(config.url_templates(), UrlTemplates::default());
    }

    #[test]
    fn test_empty_roster_is_allowed() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_port_precedence() {
        let config = Config::from_toml_str(FULL).unwrap();
        assert_eq!(config.resolve_port(Some(5001)), 5001);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[[users]\nusername = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_toml_str("[[users]]\nusername = \"a\"\npassword = \"x\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_usernames_rejected() {
        let err = Config::from_toml_str(
            "[[users]]\nusername = \"Bob\"\n[[users]]\nusername = \"bob\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"), "got: {}", err);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (contents, needle) in [
            ("[[users]]\nusername = \"  \"\n", "cannot be empty"),
            ("[[users]]\nusername = \"a b\"\n", "whitespace"),
            ("[refresh]\ninterval_secs = 0\n", "interval_secs"),
            ("[refresh]\nprobe_timeout_secs = 0\n", "probe_timeout_secs"),
            (
                "[probes]\nrepository_url = \"https://github.com/{owner}\"\n",
                "probes.repository_url",
            ),
        ] {
            let err = Config::from_toml_str(contents).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }));
            assert!(err.to_string().contains(needle), "got: {}", err);
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(Some(file.path())).await.unwrap();
        assert_eq!(config.users[0].username, "de1ux");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
