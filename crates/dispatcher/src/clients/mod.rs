//! Broker client implementations
//!
//! Contains LogBrokerClient, MemoryBrokerClient, and (with the `kafka`
//! feature) KafkaBrokerClient.

#[cfg(feature = "kafka")]
mod kafka;
mod log;
mod memory;

#[cfg(feature = "kafka")]
pub use self::kafka::KafkaBrokerClient;
pub use self::log::LogBrokerClient;
pub use self::memory::{MemoryBrokerClient, SentMessage};
