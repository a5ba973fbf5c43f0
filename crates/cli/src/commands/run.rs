//! `run` command implementation.

use anyhow::{Context, Result};
use bridge::BridgeService;
use contracts::{BridgeConfig, BrokerClient};
use tracing::{error, info, warn};

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_bridge(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut config, args);
    config_loader::validate(&config).context("Configuration invalid after CLI overrides")?;

    info!(
        topic = %config.topic,
        brokers = %config.broker_list,
        port = config.http.port,
        pattern = %config.http.pattern,
        mode = %config.encoding_mode(),
        "Configuration loaded"
    );

    if args.dry_run {
        codec::select_encoders(&config).context("Encoder selection failed")?;
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    #[cfg(feature = "kafka")]
    let client = dispatcher::KafkaBrokerClient::connect(&config)
        .context("Failed to create Kafka producer")?;

    #[cfg(not(feature = "kafka"))]
    let client = {
        warn!("Built without the `kafka` feature; events are only logged");
        dispatcher::LogBrokerClient::new("log")
    };

    serve(config, client).await
}

async fn serve<B>(config: BridgeConfig, client: B) -> Result<()>
where
    B: BrokerClient + Sync + 'static,
{
    let mut service = BridgeService::new(config, client);
    let report = service
        .run_until(shutdown_signal())
        .await
        .context("Bridge service failed")?;

    if !report.is_clean() {
        warn!("Shutdown did not complete within the drain timeout");
    }
    println!("\n=== Bridge Summary ===\n");
    println!("{report}\n");

    info!("Event Bridge finished");
    Ok(())
}

fn apply_overrides(config: &mut BridgeConfig, args: &RunArgs) {
    if let Some(ref topic) = args.topic {
        info!(topic = %topic, "Overriding topic from CLI");
        config.topic = topic.clone();
    }
    if let Some(ref brokers) = args.brokers {
        info!(brokers = %brokers, "Overriding broker list from CLI");
        config.broker_list = brokers.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding HTTP port from CLI");
        config.http.port = port;
    }
    if let Some(ref pattern) = args.pattern {
        info!(pattern = %pattern, "Overriding route pattern from CLI");
        config.http.pattern = pattern.clone();
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &BridgeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Topic: {}", config.topic);
    println!("Brokers ({}):", config.broker_addresses().len());
    for broker in config.broker_addresses() {
        println!("  - {broker}");
    }
    println!("\nHTTP:");
    println!("  Listen: {}:{}", config.http.bind_host, config.http.port);
    println!("  Pattern: {}", config.http.pattern);
    println!("  Max body: {} bytes", config.http.max_body_bytes);
    println!("  Overload: {:?}", config.http.overload);
    println!("\nEncoding: {}", config.encoding_mode());
    if let Some(ref url) = config.schema_registry_url {
        println!("  Schema registry: {url}");
    }
    println!("\nShutdown drain: {}ms", config.shutdown_drain_timeout_ms);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("bridge.toml"),
            topic: None,
            brokers: None,
            port: None,
            pattern: None,
            metrics_port: 0,
            dry_run: false,
        }
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut config = BridgeConfig::new("events", "localhost:9092");
        let args = RunArgs {
            topic: Some("audit".into()),
            port: Some(9191),
            pattern: Some("/ingest".into()),
            ..args()
        };

        apply_overrides(&mut config, &args);
        assert_eq!(config.topic, "audit");
        assert_eq!(config.broker_list, "localhost:9092");
        assert_eq!(config.http.port, 9191);
        assert_eq!(config.http.pattern, "/ingest");
    }

    #[tokio::test]
    async fn test_dry_run_does_not_bind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "topic = \"events\"\nbroker_list = \"localhost:9092\"\n").unwrap();

        let args = RunArgs {
            config: path,
            dry_run: true,
            ..args()
        };
        run_bridge(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_config_fails() {
        let args = RunArgs {
            config: PathBuf::from("/nonexistent/bridge.toml"),
            ..args()
        };
        assert!(run_bridge(&args).await.is_err());
    }
}
