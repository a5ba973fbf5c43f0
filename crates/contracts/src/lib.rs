//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the bridge.
//! Business crates depend only on this crate, never on each other's internals.
//!
//! ## Data Flow
//! - `ingestion` turns an HTTP request into an [`Envelope`]
//! - `dispatcher` hands envelopes to a single publish loop
//! - the publish loop encodes them with an [`Encoder`] and delivers them through a [`BrokerClient`]

mod client;
mod config;
mod encoder;
mod envelope;
mod error;

pub use client::*;
pub use config::*;
pub use encoder::*;
pub use envelope::*;
pub use error::*;
