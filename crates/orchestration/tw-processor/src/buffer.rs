//! Bounded prefetch buffer decoupling fetching from dispatch.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tw_error::ProcessorError;
use tw_types::Message;

/// Creates a linked sender/receiver pair with the given capacity.
///
/// The buffer is single-producer/single-consumer: the fetcher owns the
/// sender, the dispatcher owns the receiver. A full buffer blocks the sender,
/// which is the backpressure that stops the fetcher from pulling ahead of the
/// handlers by more than `capacity` messages.
pub(crate) fn bounded(capacity: usize) -> (BufferSender, BufferReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (BufferSender { tx }, BufferReceiver { rx })
}

/// Sending half of the prefetch buffer.
pub(crate) struct BufferSender {
    tx: mpsc::Sender<Message>,
}

impl BufferSender {
    /// Sends one message, waiting for capacity.
    ///
    /// Returns [`ProcessorError::Cancelled`] if the shutdown signal fires
    /// first; the message is abandoned to broker redelivery.
    pub(crate) async fn send(
        &self,
        message: Message,
        shutdown: &CancellationToken,
    ) -> Result<(), ProcessorError> {
        tokio::select! {
            _ = shutdown.cancelled() => Err(ProcessorError::Cancelled),
            sent = self.tx.send(message) => {
                // The receiver is dropped only when the dispatcher has
                // already observed cancellation.
                sent.map_err(|_| ProcessorError::Cancelled)
            }
        }
    }
}

/// Receiving half of the prefetch buffer.
pub(crate) struct BufferReceiver {
    rx: mpsc::Receiver<Message>,
}

impl BufferReceiver {
    /// Pops a buffered message without waiting.
    pub(crate) fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Waits for one message.
    ///
    /// Returns [`ProcessorError::Cancelled`] if the shutdown signal fires
    /// first. A closed buffer also maps to cancellation: the fetcher drops
    /// its sender only when shutting down.
    pub(crate) async fn recv(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<Message, ProcessorError> {
        tokio::select! {
            _ = shutdown.cancelled() => Err(ProcessorError::Cancelled),
            received = self.rx.recv() => received.ok_or(ProcessorError::Cancelled),
        }
    }
}
