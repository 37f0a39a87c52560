//! Consumer client trait.

use async_trait::async_trait;
use tw_error::TransportResult;
use tw_types::{Message, ReceiveParams};

/// Trait for broker data-plane backends.
///
/// Implementations include:
/// - HTTP broker client (production)
/// - In-memory client (testing/development)
///
/// # Message Flow
///
/// 1. The processor calls [`receive`](ConsumerClient::receive) to pull a
///    batch of deliveries for a consumer group
/// 2. After the handler succeeds it calls [`ack`](ConsumerClient::ack) with
///    the batch's ack ids
/// 3. [`nack`](ConsumerClient::nack) requests immediate redelivery; the
///    processor never calls it on its own, but error sinks and embedders may
///
/// Authentication, retries, timeouts, and URL assembly are the
/// implementation's concern and invisible to the processor.
///
/// # Concurrency
///
/// Implementations must be safe for concurrent calls: the processor invokes
/// `ack` from multiple worker tasks in parallel. Cancellation is not a
/// parameter; callers cancel an operation by dropping its future.
#[async_trait]
pub trait ConsumerClient: Send + Sync {
    /// Receives up to `params.batch_size` messages for `group`.
    ///
    /// # Returns
    ///
    /// Messages in broker delivery order. An empty vector is legal and means
    /// no messages were available.
    async fn receive(&self, group: &str, params: &ReceiveParams) -> TransportResult<Vec<Message>>;

    /// Acknowledges the listed deliveries.
    ///
    /// All-or-nothing: on error none of the ids are considered acknowledged
    /// and the broker will redeliver them after the visibility timeout.
    async fn ack(&self, group: &str, ack_ids: &[String]) -> TransportResult<()>;

    /// Negatively acknowledges the listed deliveries, making them eligible
    /// for immediate redelivery. All-or-nothing like
    /// [`ack`](ConsumerClient::ack).
    async fn nack(&self, group: &str, ack_ids: &[String]) -> TransportResult<()>;
}
