//! # Ingestion Endpoint
//!
//! HTTP 入口模块。
//!
//! Responsibilities:
//! - Register one method-agnostic route on an explicitly owned router
//! - Read the request body, wrap it as raw or structured [`Envelope`]
//! - Hand the envelope to the dispatch queue, honouring the overload policy
//! - Map body-read / encode / shutdown failures to HTTP error responses
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{build_router, HttpListener, IngestState};
//!
//! let state = IngestState::new(sender, config.encoding_mode(), config.http.overload);
//! let router = build_router(&config.http, config.encoding_mode(), state);
//! let listener = HttpListener::bind(&config.http).await?;
//! let server = listener.spawn(router, shutdown.clone());
//! ```

mod error;
mod handler;
mod headers;
mod metrics;
mod router;
mod server;
mod state;

// Re-exports
pub use contracts::Envelope;
pub use error::{ErrorDetail, ErrorResponse, IngestionError, Result};
pub use handler::{plain_handler, structured_handler};
pub use headers::{canonical_header_name, snapshot_headers};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use router::build_router;
pub use server::HttpListener;
pub use state::IngestState;
