//! Consumer-group processor.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tw_error::{ConfigError, ProcessorError};
use tw_traits::ConsumerClient;
use tw_types::ReceiveParams;

use crate::buffer;
use crate::dispatcher::{wait_for_in_flight, Dispatcher};
use crate::fetcher::Fetcher;
use crate::handler::{BatchHandler, ErrorHandler, LoggingErrorHandler};
use crate::options::ProcessorOptions;
use crate::worker::BatchWorker;

/// Long-running consumer that pulls messages for one consumer group,
/// dispatches them through a [`BatchHandler`], and acknowledges batches on
/// success.
///
/// Every message returned by the broker either has its ack id included in a
/// successful acknowledge call, or is surfaced to the error sink and left to
/// the broker's redelivery timer. The processor never acknowledges twice and
/// never negative-acknowledges on its own.
pub struct Processor {
    client: Arc<dyn ConsumerClient>,
    consumer_group: String,
    options: ProcessorOptions,
    worker: Arc<BatchWorker>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Processor {
    /// Create a processor.
    ///
    /// Applies option defaults (zero means "default") and rejects an empty
    /// consumer group or a zero-capacity prefetch buffer.
    pub fn new(
        client: Arc<dyn ConsumerClient>,
        consumer_group: impl Into<String>,
        handler: Arc<dyn BatchHandler>,
        mut options: ProcessorOptions,
    ) -> Result<Self, ProcessorError> {
        let consumer_group = consumer_group.into();
        if consumer_group.is_empty() {
            return Err(ConfigError::EmptyConsumerGroup.into());
        }
        options.validate()?;

        let error_handler = options
            .error_handler
            .clone()
            .unwrap_or_else(|| Arc::new(LoggingErrorHandler));

        let worker = Arc::new(BatchWorker {
            client: client.clone(),
            consumer_group: consumer_group.clone(),
            handler,
            error_handler: error_handler.clone(),
        });

        Ok(Self {
            client,
            consumer_group,
            options,
            worker,
            error_handler,
        })
    }

    /// Runs the processor until the shutdown token fires.
    ///
    /// Returns [`ProcessorError::Cancelled`] once shutdown was requested and
    /// every in-flight batch has completed. Messages still sitting in the
    /// prefetch buffer at that point are abandoned to broker redelivery.
    ///
    /// In direct mode (no prefetching) the loop also returns `Ok(())` as soon
    /// as a receive yields fewer messages than `max_batch_size`, treating the
    /// group as drained. Callers that want to run indefinitely should enable
    /// prefetching.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ProcessorError> {
        info!(
            group = %self.consumer_group,
            max_batch_size = self.options.max_batch_size,
            fetch_batch_size = self.options.fetch_batch_size,
            max_concurrent = self.options.max_concurrent,
            prefetching = self.options.prefetching.is_some(),
            "processor starting"
        );

        let result = match &self.options.prefetching {
            Some(prefetching) => self.run_prefetching(prefetching.buffer_size, shutdown).await,
            None => self.run_direct(shutdown).await,
        };

        match &result {
            Ok(()) => info!(group = %self.consumer_group, "processor drained"),
            Err(e) if e.is_cancelled() => info!(group = %self.consumer_group, "processor stopped"),
            Err(e) => error!(group = %self.consumer_group, error = %e, "processor failed"),
        }
        result
    }

    /// Prefetch mode: a fetcher stage fills the bounded buffer, a dispatcher
    /// stage drains it into batches.
    async fn run_prefetching(
        &self,
        buffer_size: usize,
        shutdown: CancellationToken,
    ) -> Result<(), ProcessorError> {
        let (tx, rx) = buffer::bounded(buffer_size);

        let fetcher = Fetcher {
            client: self.client.clone(),
            consumer_group: self.consumer_group.clone(),
            fetch_batch_size: self.options.fetch_batch_size,
            error_handler: self.error_handler.clone(),
        };
        let dispatcher = Dispatcher {
            worker: self.worker.clone(),
            max_batch_size: self.options.max_batch_size,
            max_concurrent: self.options.max_concurrent,
            semaphore: Arc::new(Semaphore::new(self.options.max_concurrent)),
        };

        // Both stages must run to completion: the dispatcher's exit path
        // drains in-flight batches, so neither future may be dropped early.
        let (fetch_result, dispatch_result) = tokio::join!(
            fetcher.run(tx, shutdown.clone()),
            dispatcher.run(rx, shutdown)
        );

        dispatch_result.and(fetch_result)
    }

    /// Direct mode: fetching and dispatching merged into one loop. Batches
    /// run synchronously in this task; `max_concurrent` bounds but does not
    /// parallelize across receive calls.
    async fn run_direct(&self, shutdown: CancellationToken) -> Result<(), ProcessorError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent));
        let params = ReceiveParams::batch(self.options.max_batch_size);

        loop {
            if shutdown.is_cancelled() {
                wait_for_in_flight(&semaphore, self.options.max_concurrent).await;
                return Err(ProcessorError::Cancelled);
            }

            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    wait_for_in_flight(&semaphore, self.options.max_concurrent).await;
                    return Err(ProcessorError::Cancelled);
                }
                received = self.client.receive(&self.consumer_group, &params) => received,
            };

            let messages = match received {
                Ok(messages) => messages,
                Err(e) => {
                    self.error_handler
                        .on_error(None, &ProcessorError::Receive(e))
                        .await;
                    continue;
                }
            };

            if messages.is_empty() {
                continue;
            }

            let received_len = messages.len();

            let permit = tokio::select! {
                _ = shutdown.cancelled() => {
                    wait_for_in_flight(&semaphore, self.options.max_concurrent).await;
                    return Err(ProcessorError::Cancelled);
                }
                permit = semaphore.acquire() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Err(ProcessorError::Cancelled),
                },
            };

            let result = self.worker.run_batch(&messages).await;
            drop(permit);

            if let Err(e) = result {
                self.error_handler.on_error(Some(&messages), &e).await;
                if shutdown.is_cancelled() {
                    wait_for_in_flight(&semaphore, self.options.max_concurrent).await;
                    return Err(ProcessorError::Cancelled);
                }
                continue;
            }

            // A short receive means the group is, for now, drained.
            if received_len < self.options.max_batch_size {
                return Ok(());
            }
        }
    }
}
