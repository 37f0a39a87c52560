//! Processor configuration.

use std::fmt;
use std::sync::Arc;

use tw_error::ConfigError;

use crate::handler::ErrorHandler;

/// Message prefetching behavior.
#[derive(Debug, Clone)]
pub struct PrefetchOptions {
    /// Capacity of the prefetch buffer. Must be > 0.
    pub buffer_size: usize,
}

impl PrefetchOptions {
    /// Create prefetching options with the given buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}

/// Configuration for a [`Processor`](crate::Processor).
///
/// Zero values mean "use the default": a zero `max_batch_size` becomes 1, a
/// zero `fetch_batch_size` inherits the effective `max_batch_size`, and a
/// zero `max_concurrent` becomes 1.
#[derive(Clone, Default)]
pub struct ProcessorOptions {
    /// Maximum number of messages per handler invocation.
    pub max_batch_size: usize,

    /// Number of messages requested from the broker per receive call. Can be
    /// larger than `max_batch_size` to improve throughput in prefetch mode.
    pub fetch_batch_size: usize,

    /// Maximum number of concurrently running handler invocations.
    pub max_concurrent: usize,

    /// Prefetching configuration. None means direct mode: messages are
    /// processed as they arrive, without buffering.
    pub prefetching: Option<PrefetchOptions>,

    /// Sink for non-fatal failures. None means log through `tracing`.
    pub error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl ProcessorOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum handler batch size.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Set the receive call batch size.
    pub fn with_fetch_batch_size(mut self, size: usize) -> Self {
        self.fetch_batch_size = size;
        self
    }

    /// Set the maximum number of concurrent handler invocations.
    pub fn with_max_concurrent(mut self, count: usize) -> Self {
        self.max_concurrent = count;
        self
    }

    /// Enable prefetching.
    pub fn with_prefetching(mut self, prefetching: PrefetchOptions) -> Self {
        self.prefetching = Some(prefetching);
        self
    }

    /// Set the error sink.
    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(error_handler);
        self
    }

    /// Applies defaults and checks the configuration.
    ///
    /// Defaulting order matters: `fetch_batch_size` inherits from the
    /// effective `max_batch_size`.
    pub(crate) fn validate(&mut self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            self.max_batch_size = 1;
        }
        if self.fetch_batch_size == 0 {
            self.fetch_batch_size = self.max_batch_size;
        }
        if self.max_concurrent == 0 {
            self.max_concurrent = 1;
        }
        if let Some(prefetching) = &self.prefetching {
            prefetching.validate()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorOptions")
            .field("max_batch_size", &self.max_batch_size)
            .field("fetch_batch_size", &self.fetch_batch_size)
            .field("max_concurrent", &self.max_concurrent)
            .field("prefetching", &self.prefetching)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
