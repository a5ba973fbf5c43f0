//! KafkaBrokerClient - rdkafka `FutureProducer` behind the `kafka` feature

use std::time::Duration;

use contracts::{BridgeConfig, BrokerClient, ContractError, DeliveryReceipt};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tracing::{info, instrument, warn};

/// Kafka producer client
pub struct KafkaBrokerClient {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaBrokerClient {
    /// Build the rdkafka client configuration for `config`
    pub fn client_config(config: &BridgeConfig) -> ClientConfig {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", config.broker_addresses().join(","))
            .set("client.id", &config.producer.client_id)
            .set("acks", &config.producer.acks)
            .set(
                "message.timeout.ms",
                config.producer.message_timeout_ms.to_string(),
            )
            .set(
                "socket.connection.setup.timeout.ms",
                config.connector.connect_timeout_ms.to_string(),
            )
            .set(
                "metadata.max.age.ms",
                config.connector.metadata_max_age_ms.to_string(),
            );

        // Free-form properties win over the typed settings
        for (key, value) in config
            .connector
            .properties
            .iter()
            .chain(config.producer.properties.iter())
        {
            client.set(key, value);
        }
        client
    }

    /// Connect a producer for `config`.
    ///
    /// # Errors
    /// Returns a broker connection error when rdkafka refuses the configuration
    #[instrument(name = "kafka_client_connect", skip(config), fields(brokers = %config.broker_list))]
    pub fn connect(config: &BridgeConfig) -> Result<Self, ContractError> {
        let producer: FutureProducer = Self::client_config(config)
            .create()
            .map_err(|e| ContractError::broker_connection(e.to_string()))?;

        info!(brokers = %config.broker_list, "Kafka producer created");
        Ok(Self {
            producer,
            queue_timeout: Duration::from_millis(config.producer.message_timeout_ms),
        })
    }
}

impl BrokerClient for KafkaBrokerClient {
    fn name(&self) -> &str {
        "kafka"
    }

    async fn send(
        &self,
        topic: &str,
        key: Option<Vec<u8>>,
        value: Vec<u8>,
    ) -> Result<DeliveryReceipt, ContractError> {
        let mut record: FutureRecord<'_, [u8], [u8]> =
            FutureRecord::to(topic).payload(value.as_slice());
        if let Some(key) = key.as_deref() {
            record = record.key(key);
        }

        match self
            .producer
            .send(record, Timeout::After(self.queue_timeout))
            .await
        {
            Ok((partition, offset)) => Ok(DeliveryReceipt {
                partition: Some(partition),
                offset: Some(offset),
            }),
            Err((err, _message)) => Err(ContractError::publish(topic, err.to_string())),
        }
    }

    async fn close(&self, timeout: Duration) -> Result<(), ContractError> {
        let producer = self.producer.clone();
        let flush = tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)));

        match tokio::time::timeout(timeout, flush).await {
            Ok(Ok(Ok(()))) => {
                info!("Kafka producer flushed");
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ContractError::broker_connection(format!("flush failed: {e}"))),
            Ok(Err(e)) => Err(ContractError::Other(format!("flush task failed: {e}"))),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Kafka flush timed out");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_mapping() {
        let mut config = BridgeConfig::new("events", "kafka-1:9092, kafka-2:9092");
        config
            .producer
            .properties
            .insert("compression.type".into(), "lz4".into());
        config.producer.acks = "1".into();

        let client = KafkaBrokerClient::client_config(&config);
        assert_eq!(client.get("bootstrap.servers"), Some("kafka-1:9092,kafka-2:9092"));
        assert_eq!(client.get("acks"), Some("1"));
        assert_eq!(client.get("client.id"), Some("event-bridge"));
        assert_eq!(client.get("compression.type"), Some("lz4"));
        assert_eq!(client.get("metadata.max.age.ms"), Some("300000"));
    }

    #[tokio::test]
    async fn test_connect_does_not_need_reachable_broker() {
        // librdkafka connects lazily
        let config = BridgeConfig::new("events", "127.0.0.1:9");
        let client = KafkaBrokerClient::connect(&config).unwrap();
        assert_eq!(client.name(), "kafka");
    }
}
