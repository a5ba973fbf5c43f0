//! MemoryBrokerClient - records every send in order
//!
//! Used by tests across the workspace. Cloning shares the same record log.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{BrokerClient, ContractError, DeliveryReceipt};
use tracing::debug;

/// One message as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sent: Vec<SentMessage>,
    closed: bool,
    close_timeout: Option<Duration>,
}

/// In-memory broker client
#[derive(Debug, Clone, Default)]
pub struct MemoryBrokerClient {
    state: Arc<Mutex<MemoryState>>,
    send_delay: Duration,
    fail_sends: bool,
}

impl MemoryBrokerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send sleeps `delay` before recording
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Every send fails with a publish error
    pub fn failing(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Messages recorded so far, in send order
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Values recorded so far, in send order
    pub fn values(&self) -> Vec<Vec<u8>> {
        self.lock().sent.iter().map(|m| m.value.clone()).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Timeout passed to the last `close` call
    pub fn close_timeout(&self) -> Option<Duration> {
        self.lock().close_timeout
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // Poisoning only happens if a test panicked while holding the lock
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BrokerClient for MemoryBrokerClient {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(
        &self,
        topic: &str,
        key: Option<Vec<u8>>,
        value: Vec<u8>,
    ) -> Result<DeliveryReceipt, ContractError> {
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        if self.fail_sends {
            return Err(ContractError::publish(topic, "memory client configured to fail"));
        }

        let mut state = self.lock();
        if state.closed {
            return Err(ContractError::publish(topic, "client closed"));
        }
        let offset = state.sent.len() as i64;
        state.sent.push(SentMessage {
            topic: topic.to_string(),
            key,
            value,
        });
        debug!(topic, offset, "Message recorded");

        Ok(DeliveryReceipt {
            partition: Some(0),
            offset: Some(offset),
        })
    }

    async fn close(&self, timeout: Duration) -> Result<(), ContractError> {
        let mut state = self.lock();
        state.closed = true;
        state.close_timeout = Some(timeout);
        Ok(())
    }
}
