//! Request handlers, one per encoding mode

use std::net::SocketAddr;

use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;
use bytes::Bytes;
use contracts::{Envelope, StructuredRecord};
use tracing::instrument;

use crate::headers::snapshot_headers;
use crate::state::IngestState;

/// Plain mode: forward the body untouched
#[instrument(name = "ingest_plain", skip_all)]
pub async fn plain_handler(
    State(state): State<IngestState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => state.submit(Envelope::Raw(body)).await,
        Err(rejection) => Err(rejection.into()),
    };
    state.respond(result)
}

/// Structured mode: wrap the body with its source address and headers
#[instrument(name = "ingest_structured", skip_all)]
pub async fn structured_handler(
    State(state): State<IngestState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => {
            let record = StructuredRecord {
                source: remote.to_string(),
                headers: snapshot_headers(&headers),
                body,
            };
            state.submit(Envelope::Structured(record)).await
        }
        Err(rejection) => Err(rejection.into()),
    };
    state.respond(result)
}
