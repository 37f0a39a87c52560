//! Fetch loop that fills the prefetch buffer.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;
use tw_error::ProcessorError;
use tw_traits::ConsumerClient;
use tw_types::ReceiveParams;

use crate::buffer::BufferSender;
use crate::handler::ErrorHandler;

/// Single task that pulls batches from the broker and buffers them.
pub(crate) struct Fetcher {
    pub(crate) client: Arc<dyn ConsumerClient>,
    pub(crate) consumer_group: String,
    pub(crate) fetch_batch_size: usize,
    pub(crate) error_handler: Arc<dyn ErrorHandler>,
}

impl Fetcher {
    /// Runs until cancelled.
    ///
    /// Transport errors go to the error sink and the loop continues without
    /// backoff; backoff is the sink's policy to implement. An empty response
    /// is not an error. Buffer sends block when the buffer is full, which is
    /// what keeps the fetcher from outrunning the handlers.
    pub(crate) async fn run(
        self,
        tx: BufferSender,
        shutdown: CancellationToken,
    ) -> Result<(), ProcessorError> {
        let params = ReceiveParams::batch(self.fetch_batch_size);

        loop {
            if shutdown.is_cancelled() {
                return Err(ProcessorError::Cancelled);
            }

            let received = tokio::select! {
                _ = shutdown.cancelled() => return Err(ProcessorError::Cancelled),
                received = self.client.receive(&self.consumer_group, &params) => received,
            };

            let messages = match received {
                Ok(messages) => messages,
                Err(error) => {
                    self.error_handler
                        .on_error(None, &ProcessorError::Receive(error))
                        .await;
                    continue;
                }
            };

            if messages.is_empty() {
                continue;
            }

            trace!(count = messages.len(), "buffering fetched messages");
            for message in messages {
                tx.send(message, &shutdown).await?;
            }
        }
    }
}
