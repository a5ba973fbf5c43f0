//! Layered error definitions
//!
//! Categorized by source: config / schema / encode / broker

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Codec Errors =====
    /// Schema definition or registry error
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Envelope could not be encoded
    #[error("encode error in '{encoder}': {message}")]
    Encode { encoder: String, message: String },

    // ===== Broker Errors =====
    /// Broker connector could not be established
    #[error("broker connection error: {message}")]
    BrokerConnection { message: String },

    /// Broker rejected or failed to deliver a message
    #[error("publish to '{topic}' failed: {message}")]
    Publish { topic: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create encode error
    pub fn encode(encoder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            encoder: encoder.into(),
            message: message.into(),
        }
    }

    /// Create broker connection error
    pub fn broker_connection(message: impl Into<String>) -> Self {
        Self::BrokerConnection {
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from encoding or schema resolution
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. } | Self::Schema { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContractError::config_validation("topic", "topic cannot be empty");
        assert_eq!(
            err.to_string(),
            "config validation error at 'topic': topic cannot be empty"
        );

        let err = ContractError::publish("events", "broker down");
        assert_eq!(err.to_string(), "publish to 'events' failed: broker down");
    }

    #[test]
    fn test_encode_classification() {
        assert!(ContractError::encode("avro", "bad field").is_encode());
        assert!(ContractError::schema("registry unreachable").is_encode());
        assert!(!ContractError::publish("events", "timeout").is_encode());
    }
}
