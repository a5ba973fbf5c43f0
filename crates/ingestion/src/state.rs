//! Shared handler state

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contracts::{EncodingMode, Envelope, OverloadPolicy};
use dispatcher::DispatchSender;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{IngestionError, Result};
use crate::metrics::IngestionMetrics;

/// State cloned into every request handler
#[derive(Debug, Clone)]
pub struct IngestState {
    sender: DispatchSender,
    mode: EncodingMode,
    /// Present only under the reject policy
    limiter: Option<Arc<Semaphore>>,
    metrics: Arc<IngestionMetrics>,
}

impl IngestState {
    pub fn new(sender: DispatchSender, mode: EncodingMode, overload: OverloadPolicy) -> Self {
        let limiter = match overload {
            OverloadPolicy::Queue => None,
            OverloadPolicy::Reject { max_in_flight } => {
                Some(Arc::new(Semaphore::new(max_in_flight)))
            }
        };

        Self {
            sender,
            mode,
            limiter,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Hand `envelope` to the publish loop, honouring the overload policy
    pub async fn submit(&self, envelope: Envelope) -> Result<()> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .clone()
                    .try_acquire_owned()
                    .map_err(|_| IngestionError::Overloaded)?,
            ),
            None => None,
        };

        let bytes = envelope.body_len();
        let started = Instant::now();
        self.sender.submit(envelope).await?;

        let waited = started.elapsed();
        observability::record_handoff_wait_ms(waited.as_secs_f64() * 1000.0);
        debug!(
            mode = %self.mode,
            bytes,
            wait_ms = waited.as_millis() as u64,
            "Event handed to publish loop"
        );
        Ok(())
    }

    /// Turn a handler outcome into a response and record it
    pub fn respond(&self, result: Result<()>) -> Response {
        self.metrics.record_request();

        let response = match result {
            Ok(()) => {
                self.metrics.record_accepted();
                StatusCode::OK.into_response()
            }
            Err(err) => {
                match &err {
                    IngestionError::BodyRead { .. } | IngestionError::PayloadTooLarge => {
                        self.metrics.record_body_error()
                    }
                    IngestionError::Encode { .. } => self.metrics.record_encode_error(),
                    IngestionError::Overloaded => self.metrics.record_overloaded(),
                    IngestionError::ShuttingDown => self.metrics.record_shutting_down(),
                    IngestionError::Internal { .. } => {}
                }
                warn!(mode = %self.mode, code = err.code(), error = %err, "Request rejected");
                err.into_response()
            }
        };

        observability::record_request(self.mode, response.status().as_u16());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use dispatcher::dispatch_queue;

    #[tokio::test]
    async fn test_reject_policy_turns_away_excess() {
        let (tx, mut rx) = dispatch_queue();
        let state = IngestState::new(
            tx,
            EncodingMode::Raw,
            OverloadPolicy::Reject { max_in_flight: 1 },
        );

        // First submission holds the only permit until acknowledged
        let first = {
            let state = state.clone();
            tokio::spawn(async move { state.submit(Envelope::Raw(Bytes::from_static(b"a"))).await })
        };
        let submission = rx.recv().await.unwrap();

        let second = state.submit(Envelope::Raw(Bytes::from_static(b"b"))).await;
        assert!(matches!(second, Err(IngestionError::Overloaded)));

        submission.acknowledge(Ok(()));
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_closed_queue_maps_to_shutting_down() {
        let (tx, mut rx) = dispatch_queue();
        rx.close();
        let state = IngestState::new(tx, EncodingMode::Raw, OverloadPolicy::Queue);

        let result = state.submit(Envelope::Raw(Bytes::new())).await;
        let response = state.respond(result);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.metrics().snapshot().shutting_down, 1);
    }
}
