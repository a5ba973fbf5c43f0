//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::{BridgeConfig, OverloadPolicy};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    topic: String,
    brokers: Vec<String>,
    http: HttpInfo,
    encoding: EncodingInfo,
    producer: ProducerInfo,
    shutdown_drain_timeout_ms: u64,
}

#[derive(Serialize)]
struct HttpInfo {
    bind_host: String,
    port: u16,
    pattern: String,
    max_body_bytes: usize,
    overload: String,
}

#[derive(Serialize)]
struct EncodingInfo {
    mode: String,
    encoder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_registry_url: Option<String>,
    schema_registry_timeout_ms: u64,
    has_schema: bool,
}

#[derive(Serialize)]
struct ProducerInfo {
    client_id: String,
    acks: String,
    message_timeout_ms: u64,
    connect_timeout_ms: u64,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    properties: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn overload_label(policy: OverloadPolicy) -> String {
    match policy {
        OverloadPolicy::Queue => "queue".to_string(),
        OverloadPolicy::Reject { max_in_flight } => format!("reject (max {max_in_flight} in flight)"),
    }
}

fn build_config_info(config: &BridgeConfig) -> ConfigInfo {
    let properties = config
        .connector
        .properties
        .iter()
        .chain(config.producer.properties.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        topic: config.topic.clone(),
        brokers: config.broker_addresses(),
        http: HttpInfo {
            bind_host: config.http.bind_host.clone(),
            port: config.http.port,
            pattern: config.http.pattern.clone(),
            max_body_bytes: config.http.max_body_bytes,
            overload: overload_label(config.http.overload),
        },
        encoding: EncodingInfo {
            mode: config.encoding_mode().to_string(),
            encoder: format!("{:?}", config.effective_encoder()),
            schema_registry_url: config.schema_registry_url.clone(),
            schema_registry_timeout_ms: config.schema_registry_timeout_ms,
            has_schema: config.schema.is_some(),
        },
        producer: ProducerInfo {
            client_id: config.producer.client_id.clone(),
            acks: config.producer.acks.clone(),
            message_timeout_ms: config.producer.message_timeout_ms,
            connect_timeout_ms: config.connector.connect_timeout_ms,
            properties,
        },
        shutdown_drain_timeout_ms: config.shutdown_drain_timeout_ms,
    }
}

fn print_config_info(config: &BridgeConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Event Bridge Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📮 Destination");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Topic: {}", config.topic);
    let brokers = config.broker_addresses();
    println!("   └─ Brokers ({})", brokers.len());
    for (i, broker) in brokers.iter().enumerate() {
        let prefix = if i == brokers.len() - 1 { "└─" } else { "├─" };
        println!("      {} {}", prefix, broker);
    }

    println!("\n🌐 HTTP");
    println!("   ├─ Listen: {}:{}", config.http.bind_host, config.http.port);
    println!("   ├─ Pattern: {}", config.http.pattern);
    println!("   ├─ Max Body: {} bytes", config.http.max_body_bytes);
    println!("   └─ Overload: {}", overload_label(config.http.overload));

    println!("\n🧬 Encoding");
    println!("   ├─ Mode: {}", config.encoding_mode());
    println!("   ├─ Encoder: {:?}", config.effective_encoder());
    match &config.schema_registry_url {
        Some(url) => println!(
            "   └─ Schema Registry: {} (timeout {}ms)",
            url, config.schema_registry_timeout_ms
        ),
        None => println!("   └─ Schema Registry: none"),
    }

    println!("\n⚙️  Producer");
    println!("   ├─ Client ID: {}", config.producer.client_id);
    println!("   ├─ Acks: {}", config.producer.acks);
    println!("   ├─ Message Timeout: {}ms", config.producer.message_timeout_ms);
    println!("   └─ Shutdown Drain: {}ms", config.shutdown_drain_timeout_ms);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_reflects_structured_mode() {
        let mut config = BridgeConfig::new("events", "kafka-1:9092,kafka-2:9092");
        config.schema_registry_url = Some("http://registry:8081".into());
        config.http.overload = OverloadPolicy::Reject { max_in_flight: 8 };

        let info = build_config_info(&config);
        assert_eq!(info.brokers.len(), 2);
        assert_eq!(info.encoding.mode, config.encoding_mode().to_string());
        assert_eq!(info.encoding.encoder, "SchemaRegistry");
        assert_eq!(info.http.overload, "reject (max 8 in flight)");
        assert!(!info.encoding.has_schema);
        assert_eq!(info.encoding.schema_registry_timeout_ms, 5000);
    }
}
