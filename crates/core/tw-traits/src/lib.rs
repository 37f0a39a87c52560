//! Trait definitions for the tideway client runtime.
//!
//! The processor engine depends on exactly one seam: [`ConsumerClient`],
//! the three-operation data-plane contract against a broker consumer group.

mod client;

pub use client::ConsumerClient;
