//! Process startup
//!
//! Order matters: logging first (so configuration errors are reported),
//! then configuration, then the refresh loop and the HTTP server.

use super::cli::{Args, Config};
use super::error::{ConfigError, ConfigResult};
use crate::core::error_handling::exit_with_error;
use crate::core::logging::{effective_level, init_logging};
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version;
use crate::probe::{AwsConnector, CloudConnector, HttpProbe};
use crate::refresh::{FanOutScheduler, RefreshLoop, SnapshotCache};
use crate::roster::Aggregator;
use crate::server::{self, DeploysEnvelope, ServerResult};
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Entry point used by the binary
pub async fn startup() {
    let args = Args::parse();

    let level = effective_level(args.log_level.as_deref(), args.verbosity());
    if let Err(e) = init_logging(
        level,
        args.log_format.as_deref(),
        args.log_file.as_deref(),
        args.use_color(),
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        std::process::exit(1);
    }

    log::info!("deploywatch {} starting", version::long_version());

    let config = match Config::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, "Loading configuration"),
    };

    let cache = Arc::new(SnapshotCache::new());
    let connector: Arc<dyn CloudConnector> = Arc::new(AwsConnector::new(config.probe_timeout()));
    let refresh = match build_refresh_loop(&config, Arc::clone(&cache), Some(connector)) {
        Ok(refresh) => refresh,
        Err(e) => exit_with_error(&e, "Preparing probes"),
    };

    if args.once {
        let snapshot = refresh.refresh_once().await;
        let envelope = DeploysEnvelope {
            data: snapshot.records(),
        };
        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("FATAL: cannot encode snapshot: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let port = match args.requested_port() {
        Ok(requested) => config.resolve_port(requested),
        Err(e) => exit_with_error(&e, "Reading listening port"),
    };
    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();

    if let Err(e) = run(refresh, cache, port, shutdown).await {
        exit_with_error(&e, "Serving deploys");
    }
}

/// Wire the probe, aggregator and scheduler described by `config`
///
/// Cloud checks run only when a `cloud` connector is supplied.
pub fn build_refresh_loop(
    config: &Config,
    cache: Arc<SnapshotCache>,
    cloud: Option<Arc<dyn CloudConnector>>,
) -> ConfigResult<RefreshLoop> {
    let probe = HttpProbe::new(config.url_templates(), config.probe_timeout()).map_err(|e| {
        ConfigError::Probe {
            message: e.to_string(),
        }
    })?;

    let mut aggregator = Aggregator::new(Arc::new(probe));
    match cloud {
        Some(connector) => aggregator = aggregator.with_cloud(connector),
        None if config.users_with_cloud() > 0 => {
            log::warn!(
                "{} user(s) have cloud credentials but no cloud connector is available; cloud fields will be omitted",
                config.users_with_cloud()
            );
        }
        None => {}
    }

    log::info!(
        "Watching {} user(s), refreshing every {:?}",
        config.users.len(),
        config.refresh_interval()
    );

    Ok(RefreshLoop::new(
        FanOutScheduler::new(Arc::new(aggregator)),
        config.users.clone(),
        cache,
        config.refresh_interval(),
    ))
}

/// Run the refresh loop in the background and serve until shutdown
pub async fn run(
    refresh: RefreshLoop,
    cache: Arc<SnapshotCache>,
    port: u16,
    shutdown: ShutdownCoordinator,
) -> ServerResult<()> {
    let refresher = tokio::spawn(refresh.run(shutdown.clone()));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let served = server::serve(addr, cache, shutdown.clone()).await;

    // Stop the loop whether the server ended cleanly or not
    shutdown.trigger_shutdown();
    if let Err(e) = refresher.await {
        log::error!("Refresh loop task failed: {}", e);
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_refresh_loop_with_empty_roster() {
        let config = Config::from_toml_str("").unwrap();
        let cache = Arc::new(SnapshotCache::new());

        let refresh = build_refresh_loop(&config, Arc::clone(&cache), None).unwrap();
        let snapshot = refresh.refresh_once().await;

        assert!(snapshot.is_empty());
        assert!(snapshot.generated_at().is_some());
        assert!(Arc::ptr_eq(&snapshot, &cache.current()));
    }

    struct OneBucketAccount;

    #[async_trait::async_trait]
    impl crate::probe::CloudInventory for OneBucketAccount {
        async fn list_buckets(&self) -> crate::probe::ProbeResult<Vec<String>> {
            Ok(vec!["assets".to_string()])
        }

        async fn list_distributions(&self) -> crate::probe::ProbeResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn describe_environments(
            &self,
        ) -> crate::probe::ProbeResult<Vec<crate::probe::cloud::EnvironmentSummary>> {
            Ok(Vec::new())
        }

        async fn describe_configuration_settings(
            &self,
            _environment: &crate::probe::cloud::EnvironmentSummary,
        ) -> crate::probe::ProbeResult<Vec<crate::probe::cloud::OptionSetting>> {
            Ok(Vec::new())
        }
    }

    struct OneBucketConnector;

    impl CloudConnector for OneBucketConnector {
        fn connect(
            &self,
            _owner: &str,
            _credentials: &crate::probe::CloudCredentials,
        ) -> crate::probe::ProbeResult<Arc<dyn crate::probe::CloudInventory>> {
            Ok(Arc::new(OneBucketAccount))
        }
    }

    #[tokio::test]
    async fn test_cloud_credentials_reach_the_record() {
        let config = Config::from_toml_str(
            r#"
            [probes]
            repository_url = "http://127.0.0.1:9/{owner}/{resource}"
            deployment_url = "http://127.0.0.1:9/{owner}-{resource}"

            [[users]]
            username = "de1ux"

            [[users]]
            username = "zhafner"
            [users.cloud]
            access_key_id = "AKIAEXAMPLE"
            secret_access_key = "secret"
            region = "us-east-1"
            "#,
        )
        .unwrap();
        let cache = Arc::new(SnapshotCache::new());

        let refresh =
            build_refresh_loop(&config, cache, Some(Arc::new(OneBucketConnector))).unwrap();
        let snapshot = refresh.refresh_once().await;

        let de1ux = &snapshot.records()[0];
        assert_eq!(de1ux.has_s3_buckets, None);
        let zhafner = &snapshot.records()[1];
        assert_eq!(zhafner.has_s3_buckets, Some(true));
        assert_eq!(zhafner.has_cloudfronts, Some(false));
        assert_eq!(zhafner.has_elastic_beanstalks, Some(false));
        assert_eq!(zhafner.has_rds, Some(false));
    }

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let listener = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = Config::from_toml_str("").unwrap();
        let cache = Arc::new(SnapshotCache::new());
        let refresh = build_refresh_loop(&config, Arc::clone(&cache), None).unwrap();

        let result = run(refresh, cache, port, ShutdownCoordinator::new()).await;
        assert!(matches!(result, Err(server::ServerError::Bind { .. })));
        drop(listener);
    }
}
