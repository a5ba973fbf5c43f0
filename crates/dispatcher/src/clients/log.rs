//! LogBrokerClient - logs message summaries via tracing

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use contracts::{BrokerClient, ContractError, DeliveryReceipt};
use tracing::{info, instrument};

/// Broker client that only logs what it would publish
pub struct LogBrokerClient {
    name: String,
    next_offset: AtomicI64,
}

impl LogBrokerClient {
    /// Create a new LogBrokerClient with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_offset: AtomicI64::new(0),
        }
    }
}

impl BrokerClient for LogBrokerClient {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_client_send",
        skip(self, key, value),
        fields(client = %self.name, bytes = value.len())
    )]
    async fn send(
        &self,
        topic: &str,
        key: Option<Vec<u8>>,
        value: Vec<u8>,
    ) -> Result<DeliveryReceipt, ContractError> {
        let offset = self.next_offset.fetch_add(1, Ordering::Relaxed);
        info!(
            client = %self.name,
            topic,
            offset,
            keyed = key.is_some(),
            bytes = value.len(),
            "Message published"
        );
        Ok(DeliveryReceipt {
            partition: Some(0),
            offset: Some(offset),
        })
    }

    #[instrument(name = "log_client_close", skip(self))]
    async fn close(&self, _timeout: Duration) -> Result<(), ContractError> {
        // Nothing buffered
        info!(client = %self.name, "LogBrokerClient closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_client_offsets() {
        let client = LogBrokerClient::new("test_log");

        let first = client.send("events", None, b"hello".to_vec()).await.unwrap();
        let second = client.send("events", None, b"world".to_vec()).await.unwrap();
        assert_eq!(first.offset, Some(0));
        assert_eq!(second.offset, Some(1));

        assert!(client.close(Duration::from_millis(10)).await.is_ok());
    }

    #[test]
    fn test_log_client_name() {
        let client = LogBrokerClient::new("my_logger");
        assert_eq!(client.name(), "my_logger");
    }
}
