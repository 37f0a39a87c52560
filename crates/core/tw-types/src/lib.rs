//! Shared data model for the tideway client runtime.

use bytes::Bytes;
use serde::Serialize;

/// A message delivered to a consumer group.
///
/// The record payload is opaque to the runtime: handlers interpret it, the
/// engine never does. Identity for acknowledgement accounting is the
/// per-delivery `ack_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Token issued by the broker for this delivery. Acknowledging it marks
    /// the message processed.
    pub ack_id: String,

    /// The record payload, uninterpreted.
    pub record: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(ack_id: impl Into<String>, record: impl Into<Bytes>) -> Self {
        Self {
            ack_id: ack_id.into(),
            record: record.into(),
        }
    }
}

/// Parameters for a receive call.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiveParams {
    /// Maximum number of messages to return. The broker may return fewer,
    /// including none.
    pub batch_size: usize,

    /// Long-poll wait in milliseconds. Reserved: the processor never sets it,
    /// but backends serialize it when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
}

impl ReceiveParams {
    /// Create receive parameters for a batch of the given size.
    pub fn batch(batch_size: usize) -> Self {
        Self {
            batch_size,
            wait_for: None,
        }
    }

    /// Set the long-poll wait in milliseconds.
    pub fn with_wait_for(mut self, millis: u64) -> Self {
        self.wait_for = Some(millis);
        self
    }
}
