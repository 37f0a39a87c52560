//! Batch worker: handler invocation and acknowledgement.

use std::sync::Arc;

use tokio::sync::OwnedSemaphorePermit;
use tracing::debug;
use tw_error::ProcessorError;
use tw_traits::ConsumerClient;
use tw_types::Message;

use crate::handler::{BatchHandler, ErrorHandler};

/// Runs the handler/acknowledge protocol for one batch at a time.
///
/// A batch is atomic with respect to acknowledgement: either every ack id in
/// it is acknowledged in one call, or none are and the broker's visibility
/// timer redelivers the whole batch.
pub(crate) struct BatchWorker {
    pub(crate) client: Arc<dyn ConsumerClient>,
    pub(crate) consumer_group: String,
    pub(crate) handler: Arc<dyn BatchHandler>,
    pub(crate) error_handler: Arc<dyn ErrorHandler>,
}

impl BatchWorker {
    /// Runs the batch and routes any failure to the error sink.
    ///
    /// The permit is released when this future completes, success or not.
    pub(crate) async fn process_batch(&self, batch: Vec<Message>, permit: OwnedSemaphorePermit) {
        if let Err(error) = self.run_batch(&batch).await {
            self.error_handler.on_error(Some(&batch), &error).await;
        }
        drop(permit);
    }

    /// Invokes the handler and acknowledges the batch on success.
    ///
    /// A failed acknowledge is not retried and not nacked.
    pub(crate) async fn run_batch(&self, batch: &[Message]) -> Result<(), ProcessorError> {
        self.handler
            .handle(batch)
            .await
            .map_err(ProcessorError::Handler)?;

        let ack_ids: Vec<String> = batch.iter().map(|m| m.ack_id.clone()).collect();
        self.client
            .ack(&self.consumer_group, &ack_ids)
            .await
            .map_err(ProcessorError::Ack)?;

        debug!(count = batch.len(), "batch acknowledged");
        Ok(())
    }
}
