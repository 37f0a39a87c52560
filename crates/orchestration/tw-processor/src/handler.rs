//! Handler contracts for batch processing and failure reporting.

use async_trait::async_trait;
use tracing::error;
use tw_error::ProcessorError;
use tw_types::Message;

/// Processes batches of messages.
///
/// On success the runtime acknowledges every message in the batch. On error
/// nothing is acknowledged and the broker redelivers the whole batch after
/// the visibility timeout; the runtime never calls nack on its own.
///
/// # Concurrency
///
/// The handler may be invoked from multiple tasks in parallel, up to the
/// configured `max_concurrent`, and must be safe under that parallelism.
/// Message order is broker order within a batch; no ordering is guaranteed
/// across concurrent batches.
///
/// # Shutdown
///
/// In-flight invocations are awaited during shutdown, not aborted.
/// Long-running handlers that want to cut work short should observe the same
/// cancellation token passed to [`Processor::run`](crate::Processor::run).
#[async_trait]
pub trait BatchHandler: Send + Sync {
    /// Process one batch.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the batch will be acknowledged
    /// * `Err(_)` - nothing is acknowledged; the error is reported to the
    ///   error sink as "handler failed"
    async fn handle(&self, batch: &[Message]) -> anyhow::Result<()>;
}

/// Receives non-fatal processor failures.
///
/// Invoked with `batch = None` for receive failures and with the affected
/// batch for handler and acknowledge failures. May be called from multiple
/// worker tasks concurrently.
///
/// The runtime performs no internal retries and no backoff; both are policy
/// the sink can implement (it is free to sleep, nack, or count failures).
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Report one failure.
    async fn on_error(&self, batch: Option<&[Message]>, error: &ProcessorError);
}

/// Default error sink: logs the batch size and the error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

#[async_trait]
impl ErrorHandler for LoggingErrorHandler {
    async fn on_error(&self, batch: Option<&[Message]>, error: &ProcessorError) {
        let batch_len = batch.map_or(0, <[Message]>::len);
        error!(batch_len, error = %error, "error processing batch");
    }
}
