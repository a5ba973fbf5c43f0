//! PublishLoop - the single consumer of the dispatch queue

use std::sync::Arc;
use std::time::Instant;

use contracts::BrokerClient;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::metrics::PublishMetrics;
use crate::producer::Producer;
use crate::queue::{DispatchReceiver, Submission};

/// Drains the dispatch queue into the broker client, one value at a time
pub struct PublishLoop<B> {
    topic: String,
    producer: Producer<B>,
    rx: DispatchReceiver,
    shutdown: CancellationToken,
    metrics: Arc<PublishMetrics>,
}

impl<B> PublishLoop<B>
where
    B: BrokerClient + Sync + 'static,
{
    /// `shutdown` closes the queue; the loop exits once the queue is drained
    pub fn new(
        topic: impl Into<String>,
        producer: Producer<B>,
        rx: DispatchReceiver,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            topic: topic.into(),
            producer,
            rx,
            shutdown,
            metrics: Arc::new(PublishMetrics::new()),
        }
    }

    /// Shared metrics, readable while the loop runs
    pub fn metrics(&self) -> Arc<PublishMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run until the queue is closed and drained
    #[instrument(name = "publish_loop_run", skip(self), fields(topic = %self.topic))]
    pub async fn run(mut self) {
        info!(
            topic = %self.topic,
            client = self.producer.client().name(),
            "Publish loop started"
        );

        let mut closing = false;
        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled(), if !closing => {
                    debug!("Shutdown requested, closing dispatch queue");
                    self.rx.close();
                    closing = true;
                }

                next = self.rx.recv() => match next {
                    Some(submission) => self.publish(submission).await,
                    None => break,
                },
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            received = snapshot.received,
            published = snapshot.published,
            failed = snapshot.failed,
            encode_failures = snapshot.encode_failures,
            "Publish loop drained, stopping"
        );
    }

    /// Spawn the loop as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn publish(&self, submission: Submission) {
        self.metrics.inc_received_count();

        let record = match self.producer.prepare(&self.topic, submission.envelope()).await {
            Ok(record) => record,
            Err(e) => {
                self.metrics.inc_encode_failure_count();
                observability::record_encode_failure();
                warn!(topic = %self.topic, error = %e, "Envelope rejected by encoder");
                submission.acknowledge(Err(DispatchError::from_contract(e)));
                return;
            }
        };

        // Hand-off complete; delivery belongs to the broker client
        submission.acknowledge(Ok(()));

        let started = Instant::now();
        let bytes = record.value.len();
        match self.producer.send(record).await {
            Ok(receipt) => {
                let latency = started.elapsed();
                self.metrics.record_published(latency);
                observability::record_message_published(true);
                observability::record_publish_latency_ms(latency.as_secs_f64() * 1000.0);
                debug!(
                    topic = %self.topic,
                    bytes,
                    partition = ?receipt.partition,
                    offset = ?receipt.offset,
                    "Message delivered"
                );
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                observability::record_message_published(false);
                error!(topic = %self.topic, bytes, error = %e, "Publish failed");
                // Continue processing - don't crash on single failure
            }
        }
    }
}
