//! Wire-format types for the broker data-plane API.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tw_error::{TransportError, ValidationError};
use tw_types::Message;

/// Success envelope wrapping every data-plane response.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// A single delivery in a receive response.
#[derive(Debug, Deserialize)]
pub(crate) struct ReceivedMessage {
    pub ack_id: String,
    pub data: RecordEnvelope,
}

/// The record wrapper around the opaque payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordEnvelope {
    pub record: Box<RawValue>,
}

impl From<ReceivedMessage> for Message {
    fn from(received: ReceivedMessage) -> Self {
        // Raw JSON text, never reparsed: the payload stays opaque.
        Message::new(
            received.ack_id,
            Bytes::copy_from_slice(received.data.record.get().as_bytes()),
        )
    }
}

/// Request body for ack and nack calls.
#[derive(Debug, Serialize)]
pub(crate) struct AckRequest<'a> {
    pub ack_ids: &'a [String],
}

/// The broker's error envelope.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    summary: Option<String>,
    validation_errors: Option<BTreeMap<String, serde_json::Value>>,
    code: Option<String>,
}

/// Turns a non-success response into a structured transport error.
///
/// Bodies carrying `validation_errors` become [`TransportError::Validation`],
/// bodies with a summary become [`TransportError::Api`], anything else falls
/// back to the bare status code.
pub(crate) fn error_from_response(status: u16, body: &[u8]) -> TransportError {
    let parsed: ErrorBody = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(_) => return TransportError::Status(status),
    };

    if let Some(validation_errors) = parsed.validation_errors {
        return TransportError::Validation(ValidationError {
            summary: parsed.summary.unwrap_or_default(),
            validation_errors,
            code: parsed.code,
        });
    }

    match parsed.summary {
        Some(summary) if !summary.is_empty() => TransportError::Api(summary),
        _ => TransportError::Status(status),
    }
}
