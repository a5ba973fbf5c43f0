//! Producer - broker client plus the encoders selected at start

use std::sync::Arc;

use codec::EncoderPair;
use contracts::{BrokerClient, ContractError, DeliveryReceipt, Encoder, Envelope, PayloadRole};
use tracing::instrument;

/// Encoded message ready for the broker client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRecord {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
}

/// Encodes envelopes and hands them to the broker client
pub struct Producer<B> {
    client: Arc<B>,
    encoders: EncoderPair,
}

impl<B: BrokerClient> Producer<B> {
    pub fn new(client: Arc<B>, encoders: EncoderPair) -> Self {
        Self { client, encoders }
    }

    pub fn client(&self) -> &Arc<B> {
        &self.client
    }

    pub fn encoders(&self) -> &EncoderPair {
        &self.encoders
    }

    /// Run the value encoder over `envelope`.
    ///
    /// Messages are never keyed, so only the value encoder runs.
    #[instrument(
        name = "producer_prepare",
        skip(self, envelope),
        fields(encoder = self.encoders.value.name(), bytes = envelope.body_len())
    )]
    pub async fn prepare(
        &self,
        topic: &str,
        envelope: &Envelope,
    ) -> Result<PreparedRecord, ContractError> {
        let value = self
            .encoders
            .value
            .encode(topic, PayloadRole::Value, envelope)
            .await?;

        Ok(PreparedRecord {
            topic: topic.to_string(),
            key: None,
            value,
        })
    }

    /// Hand a prepared record to the broker client
    pub async fn send(&self, record: PreparedRecord) -> Result<DeliveryReceipt, ContractError> {
        self.client
            .send(&record.topic, record.key, record.value)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MemoryBrokerClient;
    use bytes::Bytes;
    use contracts::StructuredRecord;

    #[tokio::test]
    async fn test_raw_prepare_and_send() {
        let client = Arc::new(MemoryBrokerClient::new());
        let producer = Producer::new(client.clone(), EncoderPair::raw());

        let record = producer
            .prepare("events", &Envelope::Raw(Bytes::from_static(b"hello")))
            .await
            .unwrap();
        assert_eq!(record.key, None);
        assert_eq!(record.value, b"hello".to_vec());

        producer.send(record).await.unwrap();
        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "events");
        assert_eq!(sent[0].value, b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_prepare_surfaces_encode_error() {
        let producer = Producer::new(Arc::new(MemoryBrokerClient::new()), EncoderPair::raw());
        let envelope = Envelope::Structured(StructuredRecord {
            source: "10.0.0.5:443".into(),
            headers: Default::default(),
            body: Bytes::from_static(b"payload"),
        });

        let err = producer.prepare("events", &envelope).await.unwrap_err();
        assert!(err.is_encode());
        assert_eq!(producer.encoders().key.name(), "raw");
    }
}
