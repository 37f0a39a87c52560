//! tw-processor - consumer-group message processor for the tideway broker.
//!
//! This crate turns the broker's request/response pull API into a
//! long-running, backpressure-aware dataflow with at-least-once delivery:
//!
//! - Batches of up to `max_batch_size` messages per handler invocation
//! - At most `max_concurrent` handler invocations in flight
//! - Optional prefetching through a bounded buffer that applies backpressure
//!   to the broker
//! - Acknowledgement exactly when the handler succeeds; failed batches are
//!   left to the broker's visibility timeout
//! - Cooperative shutdown that drains in-flight batches
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use tw_processor::{PrefetchOptions, Processor, ProcessorOptions};
//!
//! let options = ProcessorOptions::new()
//!     .with_max_batch_size(10)
//!     .with_max_concurrent(4)
//!     .with_prefetching(PrefetchOptions::new(100));
//!
//! let processor = Processor::new(client, "audit-log", handler, options)?;
//!
//! let shutdown = CancellationToken::new();
//! processor.run(shutdown.clone()).await?;
//! ```

mod buffer;
mod dispatcher;
mod fetcher;
pub mod handler;
pub mod options;
pub mod processor;
mod worker;

pub use handler::{BatchHandler, ErrorHandler, LoggingErrorHandler};
pub use options::{PrefetchOptions, ProcessorOptions};
pub use processor::Processor;
