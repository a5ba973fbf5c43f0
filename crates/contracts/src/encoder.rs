//! Encoder trait - turns an envelope into broker bytes

use crate::{ContractError, Envelope};

/// Which part of a broker message is being encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRole {
    Key,
    Value,
}

impl PayloadRole {
    /// Registry subject for `topic` under the topic-name strategy
    pub fn subject(&self, topic: &str) -> String {
        match self {
            Self::Key => format!("{topic}-key"),
            Self::Value => format!("{topic}-value"),
        }
    }
}

/// Byte encoder handed to the producer
#[trait_variant::make(Encoder: Send)]
pub trait LocalEncoder {
    /// Encoder name (used for logging)
    fn name(&self) -> &str;

    /// Encode `envelope` as the `role` part of a message for `topic`
    ///
    /// # Errors
    /// Returns an encode error when the envelope does not fit this encoder
    /// or an external lookup fails
    async fn encode(
        &self,
        topic: &str,
        role: PayloadRole,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, ContractError>;
}
