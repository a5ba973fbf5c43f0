//! BridgeConfig - Config Loader 输出
//!
//! 描述一个运行实例的完整配置：目标 topic、broker 列表、HTTP 入口、编码方式、关闭超时。
//! Set once before start, immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::EncodingMode;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的桥接服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// Destination topic for every incoming event
    pub topic: String,

    /// Broker list, `host:port,host:port`
    pub broker_list: String,

    /// HTTP 入口配置
    #[serde(default)]
    pub http: HttpConfig,

    /// Schema registry URL; presence switches the instance to structured encoding
    #[serde(default)]
    pub schema_registry_url: Option<String>,

    /// Avro schema (JSON text) used for structured encoding
    #[serde(default)]
    pub schema: Option<String>,

    /// Broker client publish settings
    #[serde(default)]
    pub producer: ProducerSettings,

    /// Broker client connection settings
    #[serde(default)]
    pub connector: ConnectorSettings,

    /// Per-request bound for schema registry calls (connect + response)
    #[serde(default = "default_registry_timeout_ms")]
    pub schema_registry_timeout_ms: u64,

    /// Upper bound on how long shutdown waits for in-flight messages
    #[serde(default = "default_drain_timeout_ms")]
    pub shutdown_drain_timeout_ms: u64,
}

fn default_registry_timeout_ms() -> u64 {
    5000
}

fn default_drain_timeout_ms() -> u64 {
    2000
}

impl BridgeConfig {
    /// Minimal configuration with defaults for everything optional
    pub fn new(topic: impl Into<String>, broker_list: impl Into<String>) -> Self {
        Self {
            version: ConfigVersion::V1,
            topic: topic.into(),
            broker_list: broker_list.into(),
            http: HttpConfig::default(),
            schema_registry_url: None,
            schema: None,
            producer: ProducerSettings::default(),
            connector: ConnectorSettings::default(),
            schema_registry_timeout_ms: default_registry_timeout_ms(),
            shutdown_drain_timeout_ms: default_drain_timeout_ms(),
        }
    }

    /// Broker addresses split from `broker_list`, empty entries dropped
    pub fn broker_addresses(&self) -> Vec<String> {
        self.broker_list
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Envelope variant used for the lifetime of the instance
    pub fn encoding_mode(&self) -> EncodingMode {
        if self.schema_registry_url.is_some() {
            EncodingMode::Structured
        } else {
            EncodingMode::Raw
        }
    }

    /// Encoder actually handed to the broker client.
    ///
    /// A schema registry URL overrides whatever `producer.encoder` says.
    pub fn effective_encoder(&self) -> EncoderSetting {
        if self.schema_registry_url.is_some() {
            EncoderSetting::SchemaRegistry
        } else {
            self.producer.encoder
        }
    }

    /// Shutdown drain bound
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_drain_timeout_ms)
    }

    /// Schema registry request bound
    pub fn schema_registry_timeout(&self) -> Duration {
        Duration::from_millis(self.schema_registry_timeout_ms)
    }
}

/// HTTP 入口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind host
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Bind port (0 = ephemeral)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route path the endpoint listens on, e.g. "/marathon"
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// What happens when too many requests wait on the publish loop
    #[serde(default)]
    pub overload: OverloadPolicy,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_pattern() -> String {
    "/".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            pattern: default_pattern(),
            max_body_bytes: default_max_body_bytes(),
            overload: OverloadPolicy::default(),
        }
    }
}

/// Backpressure policy for concurrent submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OverloadPolicy {
    /// Requests wait until the publish loop takes their value
    #[default]
    Queue,
    /// At most `max_in_flight` requests wait, the rest get 503 immediately
    Reject { max_in_flight: usize },
}

/// Encoder setting for keys and values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderSetting {
    /// Pass-through byte encoder
    #[default]
    Raw,
    /// Avro via schema registry
    SchemaRegistry,
}

/// Broker client publish settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerSettings {
    /// Requested encoder (overridden when a schema registry is configured)
    #[serde(default)]
    pub encoder: EncoderSetting,

    /// Client id reported to the brokers
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Acknowledgement level ("0", "1", "all")
    #[serde(default = "default_acks")]
    pub acks: String,

    /// Per-message delivery timeout
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,

    /// Extra client properties passed through verbatim
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn default_client_id() -> String {
    "event-bridge".to_string()
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            encoder: EncoderSetting::default(),
            client_id: default_client_id(),
            acks: default_acks(),
            message_timeout_ms: default_message_timeout_ms(),
            properties: HashMap::new(),
        }
    }
}

/// Broker client connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSettings {
    /// Socket connection timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Metadata refresh interval
    #[serde(default = "default_metadata_max_age_ms")]
    pub metadata_max_age_ms: u64,

    /// Extra connection properties passed through verbatim
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_metadata_max_age_ms() -> u64 {
    300_000
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            metadata_max_age_ms: default_metadata_max_age_ms(),
            properties: HashMap::new(),
        }
    }
}
