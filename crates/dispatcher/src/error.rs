//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Queue closed - the service is stopping
    #[error("dispatch queue is closed")]
    QueueClosed,

    /// Value encoder rejected the envelope
    #[error("encode failed: {0}")]
    Encode(#[source] ContractError),

    /// Broker client failed to deliver
    #[error("publish failed: {0}")]
    Publish(#[source] ContractError),

    /// Other contract error
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
}

impl DispatchError {
    /// Classify a contract error raised while preparing or sending a record
    pub fn from_contract(err: ContractError) -> Self {
        if err.is_encode() {
            Self::Encode(err)
        } else if matches!(err, ContractError::Publish { .. }) {
            Self::Publish(err)
        } else {
            Self::Contract(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = DispatchError::from_contract(ContractError::encode("avro", "bad"));
        assert!(matches!(err, DispatchError::Encode(_)));

        let err = DispatchError::from_contract(ContractError::schema("registry down"));
        assert!(matches!(err, DispatchError::Encode(_)));

        let err = DispatchError::from_contract(ContractError::publish("events", "timeout"));
        assert!(matches!(err, DispatchError::Publish(_)));

        let err = DispatchError::from_contract(ContractError::Other("x".into()));
        assert!(matches!(err, DispatchError::Contract(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(DispatchError::QueueClosed.to_string(), "dispatch queue is closed");
        let err = DispatchError::Encode(ContractError::encode("raw", "structured"));
        assert_eq!(err.to_string(), "encode failed: encode error in 'raw': structured");
    }
}
