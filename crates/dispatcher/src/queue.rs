//! Dispatch Queue - rendezvous hand-off between request handlers and the publish loop
//!
//! Many [`DispatchSender`]s, exactly one [`DispatchReceiver`]. The channel holds
//! a single slot and every submission waits for an acknowledgement from the
//! publish loop, so a submitter is released only once its value has been taken.

use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use contracts::Envelope;

use crate::error::DispatchError;

type Ack = oneshot::Sender<Result<(), DispatchError>>;

/// One value handed to the publish loop, plus its acknowledgement slot
#[derive(Debug)]
pub struct Submission {
    envelope: Envelope,
    ack: Ack,
}

impl Submission {
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Release the submitter with `result`.
    ///
    /// A submitter that already gave up (request dropped) is ignored.
    pub fn acknowledge(self, result: Result<(), DispatchError>) {
        let _ = self.ack.send(result);
    }
}

/// Create a new dispatch queue
pub fn dispatch_queue() -> (DispatchSender, DispatchReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (DispatchSender { tx }, DispatchReceiver { rx })
}

/// Producer half, cloned into every request handler
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: mpsc::Sender<Submission>,
}

impl DispatchSender {
    /// Hand `envelope` to the publish loop and wait until it has been taken.
    ///
    /// # Errors
    /// - [`DispatchError::QueueClosed`] if the queue was closed before hand-off
    /// - [`DispatchError::Encode`] if the value encoder rejected the envelope
    pub async fn submit(&self, envelope: Envelope) -> Result<(), DispatchError> {
        let (ack, acked) = oneshot::channel();

        self.tx
            .send(Submission { envelope, ack })
            .await
            .map_err(|_| DispatchError::QueueClosed)?;

        trace!("Submission enqueued, waiting for publish loop");

        // Ack dropped without an answer: the loop went away mid-shutdown
        acked.await.map_err(|_| DispatchError::QueueClosed)?
    }

    /// Whether the consumer side has closed the queue
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the publish loop
#[derive(Debug)]
pub struct DispatchReceiver {
    rx: mpsc::Receiver<Submission>,
}

impl DispatchReceiver {
    /// Next submission; `None` once the queue is closed and drained
    pub async fn recv(&mut self) -> Option<Submission> {
        self.rx.recv().await
    }

    /// Stop intake. Values already enqueued can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
