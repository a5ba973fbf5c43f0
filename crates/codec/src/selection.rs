//! Encoder selection from configuration

use std::sync::Arc;

use contracts::{BridgeConfig, ContractError, EncoderSetting, Encoder, Envelope, PayloadRole};

use crate::raw::RawEncoder;
use crate::schema_registry::SchemaRegistryEncoder;

/// Encoder chosen at start-up
#[derive(Clone)]
pub enum SelectedEncoder {
    Raw(RawEncoder),
    SchemaRegistry(Arc<SchemaRegistryEncoder>),
}

impl Encoder for SelectedEncoder {
    fn name(&self) -> &str {
        match self {
            Self::Raw(e) => e.name(),
            Self::SchemaRegistry(e) => e.name(),
        }
    }

    async fn encode(
        &self,
        topic: &str,
        role: PayloadRole,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, ContractError> {
        match self {
            Self::Raw(e) => e.encode(topic, role, envelope).await,
            Self::SchemaRegistry(e) => e.encode(topic, role, envelope).await,
        }
    }
}

/// Key and value encoders handed to the producer
#[derive(Clone)]
pub struct EncoderPair {
    pub key: SelectedEncoder,
    pub value: SelectedEncoder,
}

impl EncoderPair {
    /// Both roles pass bytes through
    pub fn raw() -> Self {
        Self {
            key: SelectedEncoder::Raw(RawEncoder),
            value: SelectedEncoder::Raw(RawEncoder),
        }
    }
}

/// Pick key/value encoders for `config`.
///
/// A schema registry URL always selects the registry encoder; without one the
/// `producer.encoder` setting decides.
///
/// # Errors
/// Returns a config error when the registry encoder is requested without a URL
/// or schema, or a schema error when the schema does not parse.
pub fn select_encoders(config: &BridgeConfig) -> Result<EncoderPair, ContractError> {
    match config.effective_encoder() {
        EncoderSetting::Raw => Ok(EncoderPair::raw()),
        EncoderSetting::SchemaRegistry => {
            let url = config.schema_registry_url.as_deref().ok_or_else(|| {
                ContractError::config_validation(
                    "schema_registry_url",
                    "schema_registry encoder requires schema_registry_url",
                )
            })?;
            let schema = config.schema.as_deref().ok_or_else(|| {
                ContractError::config_validation(
                    "schema",
                    "schema_registry encoder requires a schema",
                )
            })?;

            let encoder = Arc::new(SchemaRegistryEncoder::from_parts(
                url,
                schema,
                config.schema_registry_timeout(),
            )?);
            Ok(EncoderPair {
                key: SelectedEncoder::SchemaRegistry(encoder.clone()),
                value: SelectedEncoder::SchemaRegistry(encoder),
            })
        }
    }
}
