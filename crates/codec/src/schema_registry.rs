//! SchemaRegistryEncoder - Avro datum framed in the Confluent wire format
//!
//! ```text
//! [0x00][schema id: u32 big-endian][avro datum]
//! ```

use std::time::Duration;

use contracts::{ContractError, Encoder, Envelope, PayloadRole};

use crate::avro::EnvelopeSchema;
use crate::registry::SchemaRegistryClient;

/// Leading byte of every framed payload
pub const MAGIC_BYTE: u8 = 0;

/// Encodes structured envelopes against a registered schema
pub struct SchemaRegistryEncoder {
    schema: EnvelopeSchema,
    registry: SchemaRegistryClient,
}

impl SchemaRegistryEncoder {
    pub fn new(schema: EnvelopeSchema, registry: SchemaRegistryClient) -> Self {
        Self { schema, registry }
    }

    /// Build from the registry URL, schema text and request timeout in the configuration
    pub fn from_parts(url: &str, schema: &str, timeout: Duration) -> Result<Self, ContractError> {
        Ok(Self::new(
            EnvelopeSchema::parse(schema)?,
            SchemaRegistryClient::new(url, timeout)?,
        ))
    }

    pub fn schema(&self) -> &EnvelopeSchema {
        &self.schema
    }
}

impl Encoder for SchemaRegistryEncoder {
    fn name(&self) -> &str {
        "schema_registry"
    }

    async fn encode(
        &self,
        topic: &str,
        role: PayloadRole,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, ContractError> {
        let Envelope::Structured(record) = envelope else {
            return Err(ContractError::encode(
                self.name(),
                "raw payloads cannot be encoded against an Avro schema",
            ));
        };

        let datum = self.schema.encode_record(record)?;
        let id = self.registry.register(&role.subject(topic), &self.schema).await?;

        let mut framed = Vec::with_capacity(5 + datum.len());
        framed.push(MAGIC_BYTE);
        framed.extend_from_slice(&id.to_be_bytes());
        framed.extend_from_slice(&datum);
        Ok(framed)
    }
}
