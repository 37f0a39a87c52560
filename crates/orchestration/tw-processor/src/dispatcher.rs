//! Batch assembly and dispatch from the prefetch buffer.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tw_error::ProcessorError;

use crate::buffer::BufferReceiver;
use crate::worker::BatchWorker;

/// Single task that drains the prefetch buffer into batches and hands each
/// batch to a worker task under a concurrency permit.
pub(crate) struct Dispatcher {
    pub(crate) worker: Arc<BatchWorker>,
    pub(crate) max_batch_size: usize,
    pub(crate) max_concurrent: usize,
    pub(crate) semaphore: Arc<Semaphore>,
}

impl Dispatcher {
    /// Runs until cancelled, then drains in-flight batches before returning.
    pub(crate) async fn run(
        self,
        mut rx: BufferReceiver,
        shutdown: CancellationToken,
    ) -> Result<(), ProcessorError> {
        loop {
            // Drain whatever is immediately available, up to one batch. A
            // partial batch dispatches now rather than waiting to fill:
            // the tie between latency and fuller batches goes to latency.
            let mut batch = Vec::with_capacity(self.max_batch_size);
            while batch.len() < self.max_batch_size {
                match rx.try_recv() {
                    Some(message) => batch.push(message),
                    None => break,
                }
            }

            // Nothing buffered: block for the first message of the next batch.
            if batch.is_empty() {
                match rx.recv(&shutdown).await {
                    Ok(message) => batch.push(message),
                    Err(error) => {
                        self.wait_for_in_flight().await;
                        return Err(error);
                    }
                }
            }

            let permit = tokio::select! {
                _ = shutdown.cancelled() => {
                    self.wait_for_in_flight().await;
                    return Err(ProcessorError::Cancelled);
                }
                permit = self.semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return Err(ProcessorError::Cancelled),
                },
            };

            debug!(batch_len = batch.len(), "dispatching batch");

            let worker = self.worker.clone();
            tokio::spawn(async move {
                worker.process_batch(batch, permit).await;
            });
        }
    }

    async fn wait_for_in_flight(&self) {
        wait_for_in_flight(&self.semaphore, self.max_concurrent).await;
    }
}

/// Waits until every in-flight batch has completed by acquiring the whole
/// concurrency budget. Workers hold one permit each until they finish, so
/// holding all of them proves quiescence.
pub(crate) async fn wait_for_in_flight(semaphore: &Semaphore, max_concurrent: usize) {
    if let Ok(all) = semaphore.acquire_many(max_concurrent as u32).await {
        drop(all);
    }
}
