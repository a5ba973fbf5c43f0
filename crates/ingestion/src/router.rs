//! Explicitly owned router for the ingestion endpoint

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, MethodRouter};
use axum::Router;
use contracts::{EncodingMode, HttpConfig};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handler::{plain_handler, structured_handler};
use crate::state::IngestState;

/// Build the router serving `http.pattern` for `mode`.
///
/// The route accepts every method. A pattern ending in `/` also matches
/// everything below it (`/events/` serves `/events/a/b`).
pub fn build_router(http: &HttpConfig, mode: EncodingMode, state: IngestState) -> Router {
    let handler: MethodRouter<IngestState> = match mode {
        EncodingMode::Raw => any(plain_handler),
        EncodingMode::Structured => any(structured_handler),
    };

    let mut router = Router::new().route(&http.pattern, handler.clone());
    if let Some(subtree) = subtree_route(&http.pattern) {
        router = router.route(&subtree, handler);
    }

    info!(
        pattern = %http.pattern,
        mode = %mode,
        max_body_bytes = http.max_body_bytes,
        "Ingestion route registered"
    );

    router
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn subtree_route(pattern: &str) -> Option<String> {
    pattern
        .ends_with('/')
        .then(|| format!("{pattern}{{*rest}}"))
}
