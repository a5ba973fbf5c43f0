//! RawEncoder - pass-through byte encoder

use contracts::{ContractError, Encoder, Envelope, PayloadRole};

/// Forwards raw envelopes as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEncoder;

impl Encoder for RawEncoder {
    fn name(&self) -> &str {
        "raw"
    }

    async fn encode(
        &self,
        _topic: &str,
        _role: PayloadRole,
        envelope: &Envelope,
    ) -> Result<Vec<u8>, ContractError> {
        match envelope {
            Envelope::Raw(body) => Ok(body.to_vec()),
            Envelope::Structured(_) => Err(ContractError::encode(
                self.name(),
                "structured records require the schema registry encoder",
            )),
        }
    }
}
