//! BrokerClient trait - publish loop output interface
//!
//! The broker client owns the network send, partitioning and acknowledgement.

use std::time::Duration;

use crate::ContractError;

/// Acknowledgement returned by a broker client for one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Partition the message landed on (if the client reports it)
    pub partition: Option<i32>,
    /// Offset within the partition (if the client reports it)
    pub offset: Option<i64>,
}

/// Message broker client
///
/// All broker implementations must implement this trait.
#[trait_variant::make(BrokerClient: Send)]
pub trait LocalBrokerClient {
    /// Client name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one already-encoded message to `topic`
    ///
    /// # Errors
    /// Returns a publish error (should include the topic)
    async fn send(
        &self,
        topic: &str,
        key: Option<Vec<u8>>,
        value: Vec<u8>,
    ) -> Result<DeliveryReceipt, ContractError>;

    /// Flush in-flight messages, waiting at most `timeout`
    ///
    /// Must return once everything is flushed or the timeout elapsed.
    async fn close(&self, timeout: Duration) -> Result<(), ContractError>;
}
