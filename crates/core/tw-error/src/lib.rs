//! Error types for the tideway client runtime.
//!
//! This crate provides:
//! - [`TransportError`] - failures talking to the broker (request, API, validation)
//! - [`ValidationError`] - the broker's structured validation envelope
//! - [`ConfigError`] - rejected configuration, raised at construction time
//! - [`ProcessorError`] - batch-level and run-level processor failures
//!
//! Only [`ProcessorError::Cancelled`] terminates a processor run. Transport,
//! handler, and acknowledge failures are routed to the error sink and the
//! affected loop continues.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result alias for broker transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Failures reaching or talking to the broker.
///
/// Transport errors are never fatal to a processor run: they are reported to
/// the error sink and the receive loop continues.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be completed (connection, timeout, body I/O).
    #[error("request failed: {0}")]
    Request(String),

    /// The broker returned an error body with a summary.
    #[error("api error: {0}")]
    Api(String),

    /// The broker returned a non-success status with no parseable body.
    #[error("api error: status code {0}")]
    Status(u16),

    /// The broker rejected the request with field-level validation errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Structured validation failure returned by the broker.
///
/// Parsed from the broker's `{ summary, validation_errors, code }` error
/// envelope. Carried as a [`TransportError::Validation`] and surfaced
/// identically to any other transport failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Human-readable summary of the failure.
    pub summary: String,

    /// Per-field validation messages, keyed by field name.
    pub validation_errors: BTreeMap<String, serde_json::Value>,

    /// Machine-readable error code, when the broker provides one.
    pub code: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.summary.is_empty() {
            parts.push(self.summary.clone());
        }
        for (field, value) in &self.validation_errors {
            match value {
                serde_json::Value::Array(messages) => {
                    for message in messages {
                        parts.push(format!("{field}: {}", render_value(message)));
                    }
                }
                other => parts.push(format!("{field}: {}", render_value(other))),
            }
        }
        if parts.is_empty() {
            return write!(f, "an unknown validation error occurred");
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Renders a JSON value the way the broker's messages read: strings bare,
/// everything else as JSON.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Configuration rejected at construction time.
///
/// Configuration errors are fatal: they never enter a processor run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The consumer group identifier was empty.
    #[error("consumer group cannot be empty")]
    EmptyConsumerGroup,

    /// Prefetching was enabled with a zero-capacity buffer.
    #[error("prefetching buffer_size must be > 0")]
    ZeroBufferSize,

    /// The HTTP client could not be constructed.
    #[error("failed to create http client: {0}")]
    HttpClient(String),
}

/// Failures raised by the processor engine.
///
/// The wrapping messages are part of the contract: error sinks and tests may
/// match on "receiving messages", "handler failed", and "acknowledging
/// messages" prefixes.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Invalid construction-time options.
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),

    /// A receive call against the broker failed.
    #[error("receiving messages: {0}")]
    Receive(#[source] TransportError),

    /// The user handler rejected a batch.
    #[error("handler failed: {0:#}")]
    Handler(anyhow::Error),

    /// The handler succeeded but the acknowledge call failed. The batch is
    /// left to the broker's redelivery timer.
    #[error("acknowledging messages: {0}")]
    Ack(#[source] TransportError),

    /// The shutdown signal fired. The only error that terminates a run.
    #[error("processor cancelled")]
    Cancelled,
}

impl ProcessorError {
    /// True when the error is the cancellation signal rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let error = TransportError::Request("connection refused".to_string());
        assert_eq!(error.to_string(), "request failed: connection refused");

        let error = TransportError::Api("stream not found".to_string());
        assert_eq!(error.to_string(), "api error: stream not found");

        let error = TransportError::Status(503);
        assert_eq!(error.to_string(), "api error: status code 503");
    }

    #[test]
    fn test_validation_error_display_joins_fields() {
        let mut validation_errors = BTreeMap::new();
        validation_errors.insert(
            "batch_size".to_string(),
            serde_json::json!(["must be positive", "must be an integer"]),
        );
        validation_errors.insert("name".to_string(), serde_json::json!("is required"));

        let error = ValidationError {
            summary: "invalid request".to_string(),
            validation_errors,
            code: Some("invalid_params".to_string()),
        };

        assert_eq!(
            error.to_string(),
            "invalid request; batch_size: must be positive; batch_size: must be an integer; name: is required"
        );
    }

    #[test]
    fn test_validation_error_display_empty() {
        let error = ValidationError {
            summary: String::new(),
            validation_errors: BTreeMap::new(),
            code: None,
        };
        assert_eq!(error.to_string(), "an unknown validation error occurred");
    }

    #[test]
    fn test_processor_error_wrapping() {
        let error = ProcessorError::Receive(TransportError::Status(500));
        assert_eq!(error.to_string(), "receiving messages: api error: status code 500");

        let error = ProcessorError::Handler(anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "handler failed: boom");

        let error = ProcessorError::Ack(TransportError::Request("timeout".to_string()));
        assert_eq!(error.to_string(), "acknowledging messages: request failed: timeout");
    }

    #[test]
    fn test_config_error_names_field() {
        let error = ProcessorError::Config(ConfigError::ZeroBufferSize);
        assert!(error.to_string().contains("buffer_size"));
        assert!(error.to_string().starts_with("invalid options:"));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ProcessorError::Cancelled.is_cancelled());
        assert!(!ProcessorError::Config(ConfigError::EmptyConsumerGroup).is_cancelled());
    }
}
