//! tw-http - HTTP data-plane client for the tideway broker.
//!
//! This crate implements [`tw_traits::ConsumerClient`] over the broker's
//! HTTP API:
//!
//! - `POST /api/consumer_groups/{group}/receive` to pull a batch
//! - `POST /api/consumer_groups/{group}/ack` to acknowledge deliveries
//! - `POST /api/consumer_groups/{group}/nack` to request redelivery
//!
//! Record payloads are carried through as raw JSON text; the client never
//! interprets them. Broker error bodies of the form
//! `{ summary, validation_errors, code }` are parsed into the structured
//! errors of `tw_error`.
//!
//! # Example
//!
//! ```ignore
//! use tw_http::{HttpClientConfig, HttpConsumerClient};
//! use tw_types::ReceiveParams;
//!
//! let config = HttpClientConfig::new("https://broker.internal:7410")
//!     .with_api_token("secret");
//! let client = HttpConsumerClient::new(config)?;
//!
//! let messages = client.receive("audit-log", &ReceiveParams::batch(10)).await?;
//! ```

mod client;
mod config;
mod wire;

pub use client::HttpConsumerClient;
pub use config::{HttpClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
